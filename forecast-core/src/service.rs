//! Orchestration of one forecast fetch: projection, cycle selection,
//! the provider call under a deadline, and aggregation.

use crate::aggregate::aggregate;
use crate::config::Config;
use crate::cycle::ForecastCycle;
use crate::error::ForecastError;
use crate::location::LocationIndex;
use crate::model::{ForecastSeries, GeoPoint};
use crate::provider::{provider_from_config, ForecastProvider};
use crate::grid;
use chrono::{Local, NaiveDateTime};
use std::time::Duration;

/// Deadline for one provider call, after which the in-flight request
/// is cancelled and the fetch fails with [`ForecastError::Timeout`].
pub const FETCH_TIMEOUT: Duration = Duration::from_secs(8);

/// Entry point for forecast retrieval. One `fetch` call is one provider
/// attempt; retry and caching policy belong to the caller.
#[derive(Debug)]
pub struct ForecastService {
    provider: Box<dyn ForecastProvider>,
    timeout: Duration,
}

impl ForecastService {
    pub fn new(provider: Box<dyn ForecastProvider>) -> Self {
        Self {
            provider,
            timeout: FETCH_TIMEOUT,
        }
    }

    /// Service wired up from on-disk configuration.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let provider = provider_from_config(config)?;
        Ok(Self::new(provider).with_timeout(config.fetch_timeout()))
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Fetches and normalizes the forecast for a geographic point.
    ///
    /// # Errors
    ///
    /// Any [`ForecastError`] from the provider call or the aggregation;
    /// see the taxonomy on [`ForecastError`]. Exactly one attempt is
    /// made. A timed-out call is dropped before it can produce a
    /// partial series.
    pub async fn fetch(&self, point: GeoPoint) -> Result<ForecastSeries, ForecastError> {
        self.fetch_at(point, Local::now().naive_local()).await
    }

    /// Resolves a hierarchical place key to its representative
    /// coordinate, then fetches the forecast for it.
    ///
    /// # Errors
    ///
    /// [`ForecastError::UnknownPlace`] when the key's region has no
    /// centroid; otherwise as [`ForecastService::fetch`].
    pub async fn fetch_by_name(
        &self,
        index: &LocationIndex,
        full_name: &str,
    ) -> Result<ForecastSeries, ForecastError> {
        let point = index
            .geocode(full_name)
            .ok_or_else(|| ForecastError::UnknownPlace(full_name.to_string()))?;
        self.fetch(point).await
    }

    /// [`ForecastService::fetch`] with an explicit clock instead of
    /// `Local::now()`. Deterministic: batch or precompute callers (and
    /// tests) control the cycle and aggregation window through `now`.
    ///
    /// # Errors
    ///
    /// As [`ForecastService::fetch`].
    pub async fn fetch_at(
        &self,
        point: GeoPoint,
        now: NaiveDateTime,
    ) -> Result<ForecastSeries, ForecastError> {
        let cell = grid::project(point);
        let cycle = ForecastCycle::for_datetime(now);

        let items = tokio::time::timeout(self.timeout, self.provider.fetch_items(cell, &cycle))
            .await
            .map_err(|_| ForecastError::Timeout)??;

        if items.is_empty() {
            return Err(ForecastError::NoForecastData);
        }
        aggregate(&items, point, cell, now)
    }
}
