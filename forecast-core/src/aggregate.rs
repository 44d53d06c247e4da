//! Reduction of the provider's flat item list into a [`ForecastSeries`].
//!
//! The short-term forecast response mixes every category and every
//! forecast hour into one list. This module pulls out the three
//! temperatures a display needs (current, daily min, daily max) and an
//! hourly timeline covering the rest of today plus all of tomorrow.
//! Pure and synchronous; all failure is the single terminal
//! [`ForecastError::NoForecastData`].

use crate::error::ForecastError;
use crate::model::{Category, ForecastItem, ForecastSeries, GeoPoint, GridCell, HourlyTemp, SeriesLocation};
use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};
use std::collections::BTreeMap;

fn date_key(date: NaiveDate) -> String {
    format!("{:04}{:02}{:02}", date.year(), date.month(), date.day())
}

/// Current temperature: the TMP item at exactly the current hour slot,
/// else the earliest TMP item later today.
fn current_temperature(items: &[ForecastItem], today: &str, slot: u32) -> Option<f64> {
    let exact = items.iter().find(|item| {
        item.category == Category::Tmp
            && item.fcst_date == today
            && item.time_num() == Some(slot)
    });
    if let Some(value) = exact.and_then(ForecastItem::value) {
        return Some(value);
    }

    items
        .iter()
        .filter(|item| item.category == Category::Tmp && item.fcst_date == today)
        .filter_map(|item| Some((item.time_num()?, item.value()?)))
        .filter(|&(time, _)| time >= slot)
        .min_by_key(|&(time, _)| time)
        .map(|(_, value)| value)
}

/// First TMN/TMX reading for the given date.
fn daily_extreme(items: &[ForecastItem], today: &str, category: Category) -> Option<f64> {
    items
        .iter()
        .find(|item| item.category == category && item.fcst_date == today)
        .and_then(ForecastItem::value)
}

/// Reduces `items` to a normalized series for the location `(point, cell)`.
///
/// # Errors
///
/// [`ForecastError::NoForecastData`] when no hourly-temperature item
/// exists for the current date at or after the current hour. A missing
/// daily min or max is not an error; the current temperature stands in.
pub fn aggregate(
    items: &[ForecastItem],
    point: GeoPoint,
    cell: GridCell,
    now: NaiveDateTime,
) -> Result<ForecastSeries, ForecastError> {
    let today = date_key(now.date());
    let tomorrow = now
        .date()
        .checked_add_days(Days::new(1))
        .map(date_key)
        .unwrap_or_default();
    let slot = now.hour() * 100;

    let current_temp =
        current_temperature(items, &today, slot).ok_or(ForecastError::NoForecastData)?;

    let min_temp = daily_extreme(items, &today, Category::Tmn).unwrap_or(current_temp);
    let max_temp = daily_extreme(items, &today, Category::Tmx).unwrap_or(current_temp);

    // Deduplicate by (date, time), last-seen value winning. The BTreeMap
    // key orders by date then numeric time, which is exactly the emit order.
    let mut by_slot: BTreeMap<(String, u32), f64> = BTreeMap::new();
    for item in items {
        if item.category != Category::Tmp {
            continue;
        }
        if item.fcst_date != today && item.fcst_date != tomorrow {
            continue;
        }
        if let (Some(time), Some(value)) = (item.time_num(), item.value()) {
            by_slot.insert((item.fcst_date.clone(), time), value);
        }
    }

    let hourly = by_slot
        .into_iter()
        .filter(|((date, time), _)| *date != today || *time >= slot)
        .map(|((date, time), temp)| HourlyTemp {
            date,
            time: format!("{:02}:{:02}", time / 100, time % 100),
            temp,
        })
        .collect();

    Ok(ForecastSeries {
        current_temp,
        min_temp,
        max_temp,
        hourly,
        location: SeriesLocation { point, cell },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    const TODAY: &str = "20260830";
    const TOMORROW: &str = "20260831";

    fn item(category: Category, date: &str, time: &str, value: &str) -> ForecastItem {
        ForecastItem {
            category,
            fcst_date: date.into(),
            fcst_time: time.into(),
            fcst_value: value.into(),
            base_date: String::new(),
            base_time: String::new(),
            nx: 60,
            ny: 127,
        }
    }

    fn now(hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 8, 30)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    fn point() -> GeoPoint {
        GeoPoint::new(37.5665, 126.978)
    }

    fn cell() -> GridCell {
        GridCell { nx: 60, ny: 127 }
    }

    #[test]
    fn hourly_starts_after_now_and_includes_all_of_tomorrow() {
        let items = vec![
            item(Category::Tmp, TODAY, "0900", "21"),
            item(Category::Tmp, TODAY, "1200", "25"),
            item(Category::Tmp, TOMORROW, "0000", "18"),
        ];
        let series = aggregate(&items, point(), cell(), now(10, 30)).unwrap();

        assert_eq!(series.hourly.len(), 2);
        assert_eq!(series.hourly[0].date, TODAY);
        assert_eq!(series.hourly[0].time, "12:00");
        assert_eq!(series.hourly[1].date, TOMORROW);
        assert_eq!(series.hourly[1].time, "00:00");

        // No TMN item: min falls back to the current temperature.
        assert_eq!(series.current_temp, 25.0);
        assert_eq!(series.min_temp, 25.0);
    }

    #[test]
    fn exact_slot_match_beats_later_items() {
        let items = vec![
            item(Category::Tmp, TODAY, "1000", "22"),
            item(Category::Tmp, TODAY, "1100", "24"),
        ];
        let series = aggregate(&items, point(), cell(), now(10, 30)).unwrap();
        assert_eq!(series.current_temp, 22.0);
    }

    #[test]
    fn missing_slot_falls_forward_to_earliest_later_item() {
        let items = vec![
            item(Category::Tmp, TODAY, "1400", "27"),
            item(Category::Tmp, TODAY, "1100", "24"),
        ];
        let series = aggregate(&items, point(), cell(), now(10, 30)).unwrap();
        assert_eq!(series.current_temp, 24.0);
    }

    #[test]
    fn daily_extremes_come_from_tmn_tmx() {
        let items = vec![
            item(Category::Tmp, TODAY, "1000", "22"),
            item(Category::Tmn, TODAY, "0600", "15.5"),
            item(Category::Tmx, TODAY, "1500", "29.0"),
        ];
        let series = aggregate(&items, point(), cell(), now(10, 0)).unwrap();
        assert_eq!(series.min_temp, 15.5);
        assert_eq!(series.max_temp, 29.0);
    }

    #[test]
    fn no_temperature_today_is_no_forecast_data() {
        let items = vec![
            item(Category::Sky, TODAY, "1000", "1"),
            item(Category::Tmp, TOMORROW, "0900", "20"),
        ];
        let err = aggregate(&items, point(), cell(), now(10, 0)).unwrap_err();
        assert!(matches!(err, ForecastError::NoForecastData));
    }

    #[test]
    fn past_items_do_not_satisfy_current_temperature() {
        let items = vec![item(Category::Tmp, TODAY, "0800", "19")];
        let err = aggregate(&items, point(), cell(), now(10, 0)).unwrap_err();
        assert!(matches!(err, ForecastError::NoForecastData));
    }

    #[test]
    fn duplicate_slots_keep_last_seen_value() {
        let items = vec![
            item(Category::Tmp, TODAY, "1200", "25"),
            item(Category::Tmp, TODAY, "1200", "26"),
        ];
        let series = aggregate(&items, point(), cell(), now(11, 0)).unwrap();
        assert_eq!(series.hourly.len(), 1);
        assert_eq!(series.hourly[0].temp, 26.0);
    }

    #[test]
    fn hourly_is_sorted_across_the_day_boundary() {
        let items = vec![
            item(Category::Tmp, TOMORROW, "0300", "17"),
            item(Category::Tmp, TODAY, "2300", "19"),
            item(Category::Tmp, TOMORROW, "0000", "18"),
            item(Category::Tmp, TODAY, "1400", "26"),
        ];
        let series = aggregate(&items, point(), cell(), now(13, 0)).unwrap();

        let keys: Vec<(&str, &str)> = series
            .hourly
            .iter()
            .map(|h| (h.date.as_str(), h.time.as_str()))
            .collect();
        assert_eq!(
            keys,
            vec![
                (TODAY, "14:00"),
                (TODAY, "23:00"),
                (TOMORROW, "00:00"),
                (TOMORROW, "03:00"),
            ]
        );
    }

    #[test]
    fn non_numeric_values_are_skipped() {
        let items = vec![
            item(Category::Tmp, TODAY, "1000", "없음"),
            item(Category::Tmp, TODAY, "1100", "23"),
        ];
        let series = aggregate(&items, point(), cell(), now(10, 0)).unwrap();
        // The unparseable exact-slot item falls through to the 11:00 one.
        assert_eq!(series.current_temp, 23.0);
        assert_eq!(series.hourly.len(), 1);
    }

    #[test]
    fn series_carries_the_request_location() {
        let items = vec![item(Category::Tmp, TODAY, "1000", "22")];
        let series = aggregate(&items, point(), cell(), now(10, 0)).unwrap();
        assert_eq!(series.location.cell, cell());
        assert_eq!(series.location.point, point());
    }
}
