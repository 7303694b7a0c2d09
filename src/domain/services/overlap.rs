use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::domain::entities::DateRange;

/// How a stay's date range maps onto the days it holds a place in a kennel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OverlapPolicy {
    /// `start <= D <= end`: the checkout day still counts as occupied, so a
    /// checkout and a check-in on the same day conflict.
    #[default]
    Inclusive,
    /// Multi-day stays hold `[start, end)` so the place turns over on the
    /// checkout day. A single-day stay holds its one day.
    SameDayTurnover,
}

impl OverlapPolicy {
    pub fn from_turnover_flag(same_day_turnover: bool) -> Self {
        if same_day_turnover {
            OverlapPolicy::SameDayTurnover
        } else {
            OverlapPolicy::Inclusive
        }
    }

    /// The inclusive range of days a stay actually occupies. Never empty.
    pub fn occupied_days(&self, range: DateRange) -> DateRange {
        match self {
            OverlapPolicy::SameDayTurnover if range.start < range.end => DateRange {
                start: range.start,
                end: range.end.pred_opt().unwrap_or(range.end),
            },
            _ => range,
        }
    }

    pub fn occupies(&self, range: DateRange, day: NaiveDate) -> bool {
        self.occupied_days(range).contains(day)
    }

    pub fn conflicts(&self, a: DateRange, b: DateRange) -> bool {
        self.occupied_days(a).overlaps(&self.occupied_days(b))
    }
}
