use chrono::NaiveDate;
use serde::Serialize;

use crate::model::{GOAL_THRESHOLD, MistakeCounters, Round};

/// How many rounds the trend chart shows.
pub const SERIES_LIMIT: usize = 20;

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct SeriesPoint {
    /// `R1` is the oldest round in the series.
    pub round: String,
    pub date: NaiveDate,
    #[serde(flatten)]
    pub counters: MistakeCounters,
    pub bad_drives: u32,
    pub tiger_five: u32,
    pub goal: u32,
}

/// Oldest-first chart points for the newest [`SERIES_LIMIT`] rounds of a newest-first log.
#[must_use]
pub fn build_series(rounds: &[Round]) -> Vec<SeriesPoint> {
    rounds
        .iter()
        .take(SERIES_LIMIT)
        .rev()
        .enumerate()
        .map(|(idx, round)| SeriesPoint {
            round: format!("R{}", idx + 1),
            date: round.date(),
            counters: *round.counters(),
            bad_drives: round.bad_drives(),
            tiger_five: round.tiger_five(),
            goal: GOAL_THRESHOLD,
        })
        .collect()
}
