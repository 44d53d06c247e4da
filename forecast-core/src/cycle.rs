//! Forecast publication-cycle selection.
//!
//! The KMA issues a short-term forecast batch eight times a day. A
//! request must name the cycle it wants via `base_date`/`base_time`;
//! asking for a cycle that has not been published yet is rejected, so
//! "the most recent published cycle" is the only sensible choice.

use chrono::{Datelike, Days, NaiveDate, NaiveDateTime, Timelike};

/// Hours of day at which forecast batches are published.
pub const CYCLE_HOURS: [u32; 8] = [2, 5, 8, 11, 14, 17, 20, 23];

/// A concrete publication cycle: the `base_date`/`base_time` pair the
/// provider request carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ForecastCycle {
    pub date: NaiveDate,
    /// One of [`CYCLE_HOURS`].
    pub hour: u32,
}

impl ForecastCycle {
    /// Most recent cycle published at or before `now` (local time).
    ///
    /// Before 02:00 the latest batch is yesterday's 23:00 one, so the
    /// date component rolls back a day. Defined for every timestamp;
    /// there is no failure mode.
    pub fn for_datetime(now: NaiveDateTime) -> Self {
        let hour = now.hour();
        if hour < 2 {
            return Self {
                date: now.date().checked_sub_days(Days::new(1)).unwrap_or(now.date()),
                hour: 23,
            };
        }
        let cycle_hour = CYCLE_HOURS
            .iter()
            .rev()
            .find(|&&h| h <= hour)
            .copied()
            .unwrap_or(2);
        Self {
            date: now.date(),
            hour: cycle_hour,
        }
    }

    /// `base_date` request parameter, `YYYYMMDD`.
    pub fn base_date(&self) -> String {
        format!(
            "{:04}{:02}{:02}",
            self.date.year(),
            self.date.month(),
            self.date.day()
        )
    }

    /// `base_time` request parameter, `HH00`.
    pub fn base_time(&self) -> String {
        format!("{:02}00", self.hour)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn at(date: (i32, u32, u32), hour: u32, min: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(date.0, date.1, date.2)
            .unwrap()
            .and_hms_opt(hour, min, 0)
            .unwrap()
    }

    #[test]
    fn just_before_first_cycle_rolls_back_to_yesterday() {
        let cycle = ForecastCycle::for_datetime(at((2026, 8, 30), 1, 59));
        assert_eq!(cycle.base_date(), "20260829");
        assert_eq!(cycle.base_time(), "2300");
    }

    #[test]
    fn first_cycle_boundary_is_inclusive() {
        let cycle = ForecastCycle::for_datetime(at((2026, 8, 30), 2, 0));
        assert_eq!(cycle.base_date(), "20260830");
        assert_eq!(cycle.base_time(), "0200");
    }

    #[test]
    fn end_of_day_uses_todays_last_cycle() {
        let cycle = ForecastCycle::for_datetime(at((2026, 8, 30), 23, 59));
        assert_eq!(cycle.base_date(), "20260830");
        assert_eq!(cycle.base_time(), "2300");
    }

    #[test]
    fn mid_morning_picks_preceding_cycle() {
        let cycle = ForecastCycle::for_datetime(at((2026, 8, 30), 10, 30));
        assert_eq!(cycle.base_time(), "0800");

        let cycle = ForecastCycle::for_datetime(at((2026, 8, 30), 11, 0));
        assert_eq!(cycle.base_time(), "1100");
    }

    #[test]
    fn month_boundary_rolls_back_correctly() {
        let cycle = ForecastCycle::for_datetime(at((2026, 9, 1), 0, 30));
        assert_eq!(cycle.base_date(), "20260831");
        assert_eq!(cycle.base_time(), "2300");
    }
}
