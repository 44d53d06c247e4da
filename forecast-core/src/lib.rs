//! Forecast retrieval and normalization for the KMA 단기예보 API.
//!
//! This crate defines:
//! - WGS84 → forecast-grid projection and publication-cycle selection
//! - The HTTP provider client and its error taxonomy
//! - Aggregation of raw forecast items into a display-ready series
//! - An administrative-district index for search and geocoding
//!
//! It owns no UI and no persistence: front ends consume
//! [`ForecastSeries`] and [`LocationRecord`] values and keep favorites,
//! caching, and retry policy on their side.

pub mod aggregate;
pub mod config;
pub mod cycle;
pub mod error;
pub mod grid;
pub mod location;
pub mod model;
pub mod provider;
pub mod service;

pub use aggregate::aggregate;
pub use config::Config;
pub use cycle::ForecastCycle;
pub use error::ForecastError;
pub use location::{LocationIndex, LocationRecord, PlaceParts};
pub use model::{Category, ForecastItem, ForecastSeries, GeoPoint, GridCell, HourlyTemp};
pub use provider::{ForecastProvider, KmaProvider};
pub use service::ForecastService;
