//! Month-grouped history sections.

use std::fmt;
use std::sync::Arc;

use chrono::{DateTime, Datelike, Utc};
use serde::Serialize;
use strand_types::{BalanceMap, RawOperation};

use crate::classify::{classify, exclusion, ClassifiedOperation};

/// Calendar month (0-based, January is 0) and year of an operation, in UTC.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct MonthYear {
    pub year: i32,
    pub month: u32,
}

impl MonthYear {
    pub fn of(at: &DateTime<Utc>) -> Self {
        Self {
            year: at.year(),
            month: at.month0(),
        }
    }
}

impl fmt::Display for MonthYear {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.month, self.year)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistorySection {
    pub month_year: MonthYear,
    pub operations: Vec<ClassifiedOperation>,
}

/// A filtered, grouped view of one account's cached history.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HistoryData {
    pub balances: BalanceMap,
    pub sections: Vec<HistorySection>,
}

impl HistoryData {
    pub fn operation_count(&self) -> usize {
        self.sections.iter().map(|s| s.operations.len()).sum()
    }
}

/// Group operations into sections in input order.
///
/// Each operation joins the last section when its month matches, otherwise
/// it opens a new one. Input is expected newest first and is never re-sorted,
/// so a month that reappears later in the feed gets a second section.
pub fn build_sections<'a>(
    viewer: &str,
    operations: impl IntoIterator<Item = &'a Arc<RawOperation>>,
    hide_dust: bool,
) -> Vec<HistorySection> {
    let mut sections: Vec<HistorySection> = Vec::new();

    for op in operations {
        if exclusion(op, viewer).should_hide(hide_dust) {
            continue;
        }
        let month_year = MonthYear::of(&op.created_at);
        let classified = classify(op, viewer);
        match sections.last_mut() {
            Some(last) if last.month_year == month_year => last.operations.push(classified),
            _ => sections.push(HistorySection {
                month_year,
                operations: vec![classified],
            }),
        }
    }

    sections
}
