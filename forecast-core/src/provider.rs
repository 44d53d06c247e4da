use crate::cycle::ForecastCycle;
use crate::error::ForecastError;
use crate::model::{ForecastItem, GridCell};
use crate::Config;
use async_trait::async_trait;
use std::fmt::Debug;

pub mod kma;

pub use kma::KmaProvider;

/// A source of raw forecast items for one grid cell and publication
/// cycle. The single production implementation is [`KmaProvider`]; tests
/// substitute stubs behind this trait.
#[async_trait]
pub trait ForecastProvider: Send + Sync + Debug {
    /// Fetches the flat item list for `cell` at `cycle`.
    ///
    /// Implementations make exactly one attempt and map transport and
    /// provider-level failures onto [`ForecastError`]; they never retry.
    async fn fetch_items(
        &self,
        cell: GridCell,
        cycle: &ForecastCycle,
    ) -> Result<Vec<ForecastItem>, ForecastError>;
}

/// Construct the KMA provider from config.
pub fn provider_from_config(config: &Config) -> anyhow::Result<Box<dyn ForecastProvider>> {
    let service_key = config.require_service_key()?;
    let provider = match config.base_url.as_deref() {
        Some(base_url) => KmaProvider::with_base_url(service_key.to_owned(), base_url.to_owned()),
        None => KmaProvider::new(service_key.to_owned()),
    };
    Ok(Box::new(provider))
}
