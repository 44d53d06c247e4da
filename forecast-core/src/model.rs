use serde::{Deserialize, Serialize};

/// Geographic coordinate in WGS84 degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

impl GeoPoint {
    pub const fn new(lat: f64, lon: f64) -> Self {
        Self { lat, lon }
    }
}

/// Integer cell on the KMA forecast grid. Derived from a [`GeoPoint`]
/// by [`crate::grid::project`], never constructed from user input.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct GridCell {
    pub nx: i32,
    pub ny: i32,
}

/// KMA observation category codes (자료구분코드).
///
/// The short-term forecast response interleaves all categories in one
/// flat item list; the aggregator only consumes the temperature ones
/// (`Tmp`, `Tmn`, `Tmx`). Codes this crate does not model deserialize
/// as `Other` rather than failing the whole response.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Category {
    /// Hourly temperature (1시간 기온)
    Tmp,
    /// Daily minimum temperature (일 최저기온)
    Tmn,
    /// Daily maximum temperature (일 최고기온)
    Tmx,
    /// Sky condition
    Sky,
    /// Precipitation type
    Pty,
    /// Precipitation probability
    Pop,
    /// Hourly precipitation amount
    Pcp,
    /// Humidity
    Reh,
    /// Fresh snowfall
    Sno,
    /// Wind direction
    Vec,
    /// Wind speed
    Wsd,
    #[serde(other)]
    Other,
}

/// One forecast observation as delivered by the provider.
///
/// `fcst_value` stays string-encoded on the wire; non-numeric values
/// (e.g. `PCP`'s "강수없음") are legal for categories we ignore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastItem {
    pub category: Category,
    #[serde(rename = "fcstDate")]
    pub fcst_date: String,
    #[serde(rename = "fcstTime")]
    pub fcst_time: String,
    #[serde(rename = "fcstValue")]
    pub fcst_value: String,
    #[serde(rename = "baseDate", default)]
    pub base_date: String,
    #[serde(rename = "baseTime", default)]
    pub base_time: String,
    #[serde(default)]
    pub nx: i32,
    #[serde(default)]
    pub ny: i32,
}

impl ForecastItem {
    /// Numeric reading of `fcst_value`, `None` when not a number.
    pub fn value(&self) -> Option<f64> {
        self.fcst_value.parse().ok()
    }

    /// `fcst_time` ("HHmm") as a number for chronological ordering.
    pub fn time_num(&self) -> Option<u32> {
        self.fcst_time.parse().ok()
    }
}

/// One entry of the hourly timeline.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HourlyTemp {
    /// Forecast calendar date, `YYYYMMDD`.
    pub date: String,
    /// Display-ready time, `HH:MM`.
    pub time: String,
    pub temp: f64,
}

/// The coordinate a series was fetched for, in both spaces.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SeriesLocation {
    pub point: GeoPoint,
    pub cell: GridCell,
}

/// Normalized forecast output: what a UI renders directly.
///
/// `hourly` is sorted ascending by (date, time) and covers the rest of
/// today plus all of tomorrow. Upstream data does not guarantee
/// `min_temp <= current_temp <= max_temp`; consumers must not assume it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ForecastSeries {
    pub current_temp: f64,
    pub min_temp: f64,
    pub max_temp: f64,
    pub hourly: Vec<HourlyTemp>,
    pub location: SeriesLocation,
}
