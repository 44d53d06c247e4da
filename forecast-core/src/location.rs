//! Administrative-district index: forward search, approximate
//! geocoding, and coarse reverse lookup.
//!
//! The dataset is a JSON array of `"시/도[-구/군[-동]]"` strings served
//! as a static asset. It is loaded at most once per index instance;
//! concurrent first callers share a single read via
//! [`tokio::sync::OnceCell`], and the parsed records are read-only for
//! the rest of the process lifetime.

use crate::error::ForecastError;
use crate::model::GeoPoint;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::sync::OnceCell;

/// Region whose bounding box is reported when no box matches.
pub const DEFAULT_FALLBACK_REGION: &str = "서울특별시";

/// Representative coordinates for each top-level region (city-hall
/// locations). The table doubles as the known-region set for geocoding.
const REGION_CENTROIDS: [(&str, f64, f64); 17] = [
    ("서울특별시", 37.5665, 126.978),
    ("부산광역시", 35.1796, 129.0756),
    ("대구광역시", 35.8714, 128.6014),
    ("인천광역시", 37.4563, 126.7052),
    ("광주광역시", 35.1595, 126.8526),
    ("대전광역시", 36.3504, 127.3845),
    ("울산광역시", 35.5384, 129.3114),
    ("세종특별자치시", 36.48, 127.289),
    ("경기도", 37.4138, 127.5183),
    ("강원특별자치도", 37.8228, 128.1555),
    ("충청북도", 36.8, 127.7),
    ("충청남도", 36.5184, 126.8),
    ("전북특별자치도", 35.7175, 127.153),
    ("전라남도", 34.8679, 126.991),
    ("경상북도", 36.4919, 128.8889),
    ("경상남도", 35.4606, 128.2132),
    ("제주특별자치도", 33.4996, 126.5312),
];

/// Hand-maintained bounding boxes `(region, lat_min, lat_max, lon_min,
/// lon_max)`, tested in order. Deliberately coarse: the metro boxes come
/// first so the overlapping province boxes cannot shadow them.
const REGION_BOUNDS: [(&str, f64, f64, f64, f64); 17] = [
    ("서울특별시", 37.4, 37.7, 126.8, 127.2),
    ("부산광역시", 35.0, 35.3, 129.0, 129.3),
    ("대구광역시", 35.8, 36.0, 128.5, 128.7),
    ("인천광역시", 37.4, 37.5, 126.6, 126.8),
    ("광주광역시", 35.1, 35.2, 126.8, 126.9),
    ("대전광역시", 36.3, 36.4, 127.3, 127.5),
    ("울산광역시", 35.5, 35.6, 129.2, 129.4),
    ("세종특별자치시", 36.4, 36.6, 127.2, 127.3),
    ("경기도", 37.0, 38.5, 126.5, 127.8),
    ("강원특별자치도", 37.0, 38.6, 127.0, 129.6),
    ("충청북도", 36.0, 37.5, 127.0, 128.5),
    ("충청남도", 35.5, 36.8, 126.0, 127.5),
    ("전북특별자치도", 35.0, 36.5, 126.0, 127.5),
    ("전라남도", 34.0, 35.5, 125.0, 127.5),
    ("경상북도", 35.5, 37.5, 128.0, 130.0),
    ("경상남도", 34.5, 35.8, 127.5, 129.5),
    ("제주특별자치도", 33.0, 34.0, 126.0, 127.0),
];

/// Jitter bound for district-level geocoding, degrees. Halved again at
/// neighborhood granularity.
const DISTRICT_JITTER_DEG: f64 = 0.05;

/// Components of a hierarchical place key.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceParts {
    pub region: String,
    pub district: Option<String>,
    pub neighborhood: Option<String>,
}

/// One administrative place from the static dataset.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationRecord {
    /// Hierarchical key, e.g. `"서울특별시-종로구-청운동"`.
    pub full_name: String,
    /// Space-joined display form.
    pub display_name: String,
    /// User-assigned alias; never set by the core, carried for
    /// consumers that persist favorites.
    #[serde(default)]
    pub alias: Option<String>,
    pub parts: PlaceParts,
}

impl LocationRecord {
    fn parse(raw: &str) -> Option<Self> {
        let full_name = raw.trim();
        if full_name.is_empty() {
            return None;
        }
        let mut parts = full_name.split('-');
        let region = parts.next()?.to_string();
        if region.is_empty() {
            return None;
        }
        Some(Self {
            full_name: full_name.to_string(),
            display_name: full_name.replace('-', " "),
            alias: None,
            parts: PlaceParts {
                region,
                district: parts.next().map(str::to_string),
                neighborhood: parts.next().map(str::to_string),
            },
        })
    }
}

/// Shared read-only district index. Construct once and hand out by
/// reference; the loaded dataset is the only long-lived resource the
/// core owns.
#[derive(Debug)]
pub struct LocationIndex {
    path: PathBuf,
    fallback_region: Option<String>,
    records: OnceCell<Vec<LocationRecord>>,
    load_error_surfaced: AtomicBool,
}

impl LocationIndex {
    /// Index backed by the dataset file at `path`. Reverse lookups fall
    /// back to [`DEFAULT_FALLBACK_REGION`] when no bounding box matches.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            fallback_region: Some(DEFAULT_FALLBACK_REGION.to_string()),
            records: OnceCell::new(),
            load_error_surfaced: AtomicBool::new(false),
        }
    }

    /// Replaces or disables the reverse-lookup fallback region.
    pub fn with_fallback(mut self, fallback: Option<String>) -> Self {
        self.fallback_region = fallback;
        self
    }

    /// Loads and caches the dataset. Concurrent first callers coalesce
    /// into one file read; a failed load is not cached, so a later call
    /// may retry.
    ///
    /// Malformed entries are skipped. An empty (but well-formed) array
    /// is a successful empty set, not an error.
    ///
    /// # Errors
    ///
    /// [`ForecastError::DataUnavailable`] when the file is missing or
    /// is not a JSON array of strings.
    pub async fn load(&self) -> Result<&[LocationRecord], ForecastError> {
        self.records
            .get_or_try_init(|| async {
                let bytes = tokio::fs::read(&self.path).await.map_err(|e| {
                    ForecastError::DataUnavailable(format!("{}: {e}", self.path.display()))
                })?;
                let raw: Vec<String> = serde_json::from_slice(&bytes).map_err(|e| {
                    ForecastError::DataUnavailable(format!("{}: {e}", self.path.display()))
                })?;
                let records: Vec<LocationRecord> = raw
                    .iter()
                    .filter_map(|entry| LocationRecord::parse(entry))
                    .collect();
                tracing::info!(count = records.len(), path = %self.path.display(), "district dataset loaded");
                Ok(records)
            })
            .await
            .map(Vec::as_slice)
    }

    /// Case-insensitive substring search over hierarchical keys and
    /// display forms, ranked exact > prefix > substring, dataset order
    /// within each rank, truncated to `limit`.
    ///
    /// A blank query returns an empty result without touching the
    /// dataset.
    ///
    /// # Errors
    ///
    /// The first failed dataset load surfaces
    /// [`ForecastError::DataUnavailable`]; subsequent calls degrade to
    /// an empty result instead.
    pub async fn search(
        &self,
        query: &str,
        limit: usize,
    ) -> Result<Vec<LocationRecord>, ForecastError> {
        let needle = query.trim().to_lowercase();
        if needle.is_empty() {
            return Ok(Vec::new());
        }

        let records = match self.load().await {
            Ok(records) => records,
            Err(err) => {
                if self.load_error_surfaced.swap(true, Ordering::SeqCst) {
                    tracing::warn!(error = %err, "district dataset still unavailable, returning no matches");
                    return Ok(Vec::new());
                }
                return Err(err);
            }
        };

        let mut matched: Vec<(u8, &LocationRecord)> = records
            .iter()
            .filter_map(|record| {
                let full = record.full_name.to_lowercase();
                let display = record.display_name.to_lowercase();
                if full == needle || display == needle {
                    Some((0, record))
                } else if full.starts_with(&needle) || display.starts_with(&needle) {
                    Some((1, record))
                } else if full.contains(&needle) || display.contains(&needle) {
                    Some((2, record))
                } else {
                    None
                }
            })
            .collect();

        // Stable sort keeps dataset order inside each rank group.
        matched.sort_by_key(|&(rank, _)| rank);
        Ok(matched
            .into_iter()
            .take(limit)
            .map(|(_, record)| record.clone())
            .collect())
    }

    /// Resolves a hierarchical key to a representative coordinate.
    ///
    /// Region-level keys return the fixed centroid. District- and
    /// neighborhood-level keys perturb the region centroid by a bounded
    /// offset derived from a hash of the full key, so the same key
    /// always geocodes to the same point. Returns `None` when the
    /// region has no centroid entry.
    pub fn geocode(&self, full_name: &str) -> Option<GeoPoint> {
        let record = LocationRecord::parse(full_name)?;
        let (_, lat, lon) = REGION_CENTROIDS
            .iter()
            .find(|(name, _, _)| *name == record.parts.region)?;
        let base = GeoPoint::new(*lat, *lon);

        if record.parts.district.is_none() {
            return Some(base);
        }
        let scale = if record.parts.neighborhood.is_some() {
            DISTRICT_JITTER_DEG / 2.0
        } else {
            DISTRICT_JITTER_DEG
        };
        let (dlat, dlon) = keyed_offset(&record.full_name, scale);
        Some(GeoPoint::new(base.lat + dlat, base.lon + dlon))
    }

    /// Coarse reverse lookup: first region whose bounding box contains
    /// the point, else the configured fallback region, else `None`.
    pub fn reverse_geocode(&self, point: GeoPoint) -> Option<String> {
        REGION_BOUNDS
            .iter()
            .find(|&&(_, lat_min, lat_max, lon_min, lon_max)| {
                point.lat >= lat_min
                    && point.lat <= lat_max
                    && point.lon >= lon_min
                    && point.lon <= lon_max
            })
            .map(|&(name, ..)| name.to_string())
            .or_else(|| self.fallback_region.clone())
    }
}

/// Deterministic offset in `[-scale, scale]` per axis, keyed by the
/// hierarchical string (FNV-1a). A stand-in for true geocoding: stable
/// across calls, spread within the region.
fn keyed_offset(key: &str, scale: f64) -> (f64, f64) {
    const FNV_OFFSET: u64 = 0xcbf2_9ce4_8422_2325;
    const FNV_PRIME: u64 = 0x0000_0100_0000_01b3;

    let mut hash = FNV_OFFSET;
    for byte in key.as_bytes() {
        hash ^= u64::from(*byte);
        hash = hash.wrapping_mul(FNV_PRIME);
    }

    let lat_unit = (hash & 0xffff) as f64 / f64::from(0xffffu16);
    let lon_unit = ((hash >> 16) & 0xffff) as f64 / f64::from(0xffffu16);
    (
        (lat_unit - 0.5) * 2.0 * scale,
        (lon_unit - 0.5) * 2.0 * scale,
    )
}
