use serde::Serialize;
use std::collections::BTreeMap;

use crate::model::{GoalStatus, Metric, MistakeCounters, Round};

/// Window sizes the stats view reports on, newest rounds first.
pub const ROLLING_WINDOWS: [usize; 3] = [5, 10, 20];

/// The breakdown chart only appears once this many rounds exist.
pub const BREAKDOWN_WINDOW: usize = 5;

/// Sum of the five mistake counters, `None` if it does not fit in a `u32`.
#[must_use]
pub fn tiger_five_of(counters: &MistakeCounters) -> Option<u32> {
    counters
        .double_bogey_or_worse
        .checked_add(counters.bogey_on_par5)?
        .checked_add(counters.three_putts)?
        .checked_add(counters.bogey_inside150)?
        .checked_add(counters.missed_easy_saves)
}

/// The newest `count` rounds of a newest-first log.
#[must_use]
pub fn recent(rounds: &[Round], count: usize) -> &[Round] {
    &rounds[..count.min(rounds.len())]
}

/// Mean of each metric in tenths, rounded half up so 0.25 shows as 0.3.
fn means_in_tenths(rounds: &[Round]) -> Option<BTreeMap<Metric, u64>> {
    if rounds.is_empty() {
        return None;
    }
    let count = rounds.len() as u64;
    Some(
        Metric::ALL
            .iter()
            .map(|&metric| {
                let total: u64 = rounds.iter().map(|r| u64::from(metric.value(r))).sum();
                (metric, (20 * total + count) / (2 * count))
            })
            .collect(),
    )
}

fn format_tenths(tenths: u64) -> String {
    format!("{}.{}", tenths / 10, tenths % 10)
}

/// Mean of every tracked metric, formatted to one decimal place.
/// An empty slice gives an empty map.
#[must_use]
pub fn averages(rounds: &[Round]) -> BTreeMap<Metric, String> {
    means_in_tenths(rounds)
        .unwrap_or_default()
        .into_iter()
        .map(|(metric, tenths)| (metric, format_tenths(tenths)))
        .collect()
}

#[derive(Serialize, Clone, Debug, PartialEq)]
pub struct WindowSummary {
    pub label: String,
    pub size: usize,
    pub count: usize,
    pub averages: BTreeMap<Metric, String>,
    pub status: GoalStatus,
}

/// Summaries for the last 5, 10 and 20 rounds. Windows with no rounds are left out.
#[must_use]
pub fn rolling_windows(rounds: &[Round]) -> Vec<WindowSummary> {
    ROLLING_WINDOWS
        .iter()
        .filter_map(|&size| {
            let window = recent(rounds, size);
            let tenths = means_in_tenths(window)?;
            // status follows the rounded figure that gets shown
            let tiger_five = tenths.get(&Metric::TigerFive).copied().unwrap_or_default();
            Some(WindowSummary {
                label: format!("Last {size} Rounds"),
                size,
                count: window.len(),
                status: GoalStatus::classify(tiger_five as f64 / 10.0),
                averages: tenths
                    .into_iter()
                    .map(|(metric, t)| (metric, format_tenths(t)))
                    .collect(),
            })
        })
        .collect()
}

/// Last-five averages of the individual mistakes plus bad drives, keyed by display name.
/// `None` until the log holds enough rounds.
#[must_use]
pub fn mistake_breakdown(rounds: &[Round]) -> Option<Vec<(&'static str, f64)>> {
    if rounds.len() < BREAKDOWN_WINDOW {
        return None;
    }
    let means = means_in_tenths(recent(rounds, BREAKDOWN_WINDOW))?;
    Some(
        means
            .into_iter()
            .filter(|(metric, _)| *metric != Metric::TigerFive)
            .map(|(metric, tenths)| (metric.label(), tenths as f64 / 10.0))
            .collect(),
    )
}
