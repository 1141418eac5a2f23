use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

/// A Tiger Five at or below this is a good round.
pub const GOAL_THRESHOLD: u32 = 6;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

/// The five mistake categories that make up the Tiger Five.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct MistakeCounters {
    pub double_bogey_or_worse: u32,
    pub bogey_on_par5: u32,
    pub three_putts: u32,
    pub bogey_inside150: u32,
    pub missed_easy_saves: u32,
}

impl MistakeCounters {
    #[must_use]
    pub fn new(
        double_bogey_or_worse: u32,
        bogey_on_par5: u32,
        three_putts: u32,
        bogey_inside150: u32,
        missed_easy_saves: u32,
    ) -> Self {
        Self {
            double_bogey_or_worse,
            bogey_on_par5,
            three_putts,
            bogey_inside150,
            missed_easy_saves,
        }
    }
}

#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq)]
pub enum GoalStatus {
    Met,
    Above,
}

impl GoalStatus {
    #[must_use]
    pub fn classify(tiger_five: f64) -> Self {
        if tiger_five <= f64::from(GOAL_THRESHOLD) {
            GoalStatus::Met
        } else {
            GoalStatus::Above
        }
    }

    #[must_use]
    pub fn is_met(self) -> bool {
        matches!(self, GoalStatus::Met)
    }

    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            GoalStatus::Met => "Goal Met",
            GoalStatus::Above => "Above Goal",
        }
    }
}

/// The seven per-round numbers that get averaged and charted.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "camelCase")]
pub enum Metric {
    TigerFive,
    DoubleBogeyOrWorse,
    BogeyOnPar5,
    ThreePutts,
    BogeyInside150,
    MissedEasySaves,
    BadDrives,
}

impl Metric {
    pub const ALL: [Metric; 7] = [
        Metric::TigerFive,
        Metric::DoubleBogeyOrWorse,
        Metric::BogeyOnPar5,
        Metric::ThreePutts,
        Metric::BogeyInside150,
        Metric::MissedEasySaves,
        Metric::BadDrives,
    ];

    /// Display name, shared with the csv header.
    #[must_use]
    pub fn label(self) -> &'static str {
        match self {
            Metric::TigerFive => "Tiger Five",
            Metric::DoubleBogeyOrWorse => "Double Bogey+",
            Metric::BogeyOnPar5 => "Bogey Par 5",
            Metric::ThreePutts => "3-Putts",
            Metric::BogeyInside150 => "Bogey <150y",
            Metric::MissedEasySaves => "Missed Saves",
            Metric::BadDrives => "Bad Drives",
        }
    }

    #[must_use]
    pub fn value(self, round: &Round) -> u32 {
        let c = round.counters();
        match self {
            Metric::TigerFive => round.tiger_five(),
            Metric::DoubleBogeyOrWorse => c.double_bogey_or_worse,
            Metric::BogeyOnPar5 => c.bogey_on_par5,
            Metric::ThreePutts => c.three_putts,
            Metric::BogeyInside150 => c.bogey_inside150,
            Metric::MissedEasySaves => c.missed_easy_saves,
            Metric::BadDrives => round.bad_drives(),
        }
    }
}

/// A saved round. Immutable; `tiger_five` always equals the sum of the counters.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq, Eq)]
#[serde(try_from = "RoundRecord", into = "RoundRecord")]
pub struct Round {
    id: i64,
    date: NaiveDate,
    course: String,
    total_score: i32,
    counters: MistakeCounters,
    bad_drives: u32,
    tiger_five: u32,
}

impl Round {
    /// Validates `input` and derives the Tiger Five.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the course is blank, the total score is missing, the date is not ISO
    /// or the counters overflow.
    pub fn from_input(id: i64, input: &RoundInput) -> Result<Self, ValidationError> {
        let date = input.validate()?;
        let total_score = input.total_score.ok_or(ValidationError::MissingTotalScore)?;
        let tiger_five =
            crate::metrics::tiger_five_of(&input.counters).ok_or(ValidationError::CounterOverflow)?;
        Ok(Self {
            id,
            date,
            course: input.course.clone(),
            total_score,
            counters: input.counters,
            bad_drives: input.bad_drives,
            tiger_five,
        })
    }

    #[must_use]
    pub fn id(&self) -> i64 {
        self.id
    }

    #[must_use]
    pub fn date(&self) -> NaiveDate {
        self.date
    }

    #[must_use]
    pub fn course(&self) -> &str {
        &self.course
    }

    #[must_use]
    pub fn total_score(&self) -> i32 {
        self.total_score
    }

    #[must_use]
    pub fn counters(&self) -> &MistakeCounters {
        &self.counters
    }

    #[must_use]
    pub fn bad_drives(&self) -> u32 {
        self.bad_drives
    }

    #[must_use]
    pub fn tiger_five(&self) -> u32 {
        self.tiger_five
    }

    #[must_use]
    pub fn goal_status(&self) -> GoalStatus {
        GoalStatus::classify(f64::from(self.tiger_five))
    }
}

/// Stored shape of a round. Field names match the persisted `roundLog` json.
#[derive(Serialize, Deserialize, Clone, Debug)]
#[serde(rename_all = "camelCase")]
pub struct RoundRecord {
    pub id: i64,
    pub date: NaiveDate,
    pub course: String,
    pub total_score: i32,
    #[serde(flatten)]
    pub counters: MistakeCounters,
    pub bad_drives: u32,
    pub tiger_five: u32,
}

impl TryFrom<RoundRecord> for Round {
    type Error = String;

    fn try_from(r: RoundRecord) -> Result<Self, Self::Error> {
        let Some(expected) = crate::metrics::tiger_five_of(&r.counters) else {
            return Err(format!("round {} has counters too large to add up", r.id));
        };
        if r.tiger_five != expected {
            return Err(format!(
                "round {} has tigerFive {} but its counters sum to {expected}",
                r.id, r.tiger_five
            ));
        }
        Ok(Self {
            id: r.id,
            date: r.date,
            course: r.course,
            total_score: r.total_score,
            counters: r.counters,
            bad_drives: r.bad_drives,
            tiger_five: r.tiger_five,
        })
    }
}

impl From<Round> for RoundRecord {
    fn from(r: Round) -> Self {
        Self {
            id: r.id,
            date: r.date,
            course: r.course,
            total_score: r.total_score,
            counters: r.counters,
            bad_drives: r.bad_drives,
            tiger_five: r.tiger_five,
        }
    }
}

/// Raw field values for a round that has not been saved yet.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RoundInput {
    pub date: String,
    pub course: String,
    pub total_score: Option<i32>,
    pub counters: MistakeCounters,
    pub bad_drives: u32,
}

impl Default for RoundInput {
    fn default() -> Self {
        Self::new()
    }
}

impl RoundInput {
    /// Blank form: today's date, zeroed counters, no course or score.
    #[must_use]
    pub fn new() -> Self {
        Self {
            date: Local::now().date_naive().format(DATE_FORMAT).to_string(),
            course: String::new(),
            total_score: None,
            counters: MistakeCounters::default(),
            bad_drives: 0,
        }
    }

    /// Tiger Five this input would be saved with. Saturates where saving would be refused.
    #[must_use]
    pub fn tiger_five(&self) -> u32 {
        crate::metrics::tiger_five_of(&self.counters).unwrap_or(u32::MAX)
    }

    #[must_use]
    pub fn goal_status(&self) -> GoalStatus {
        GoalStatus::classify(f64::from(self.tiger_five()))
    }

    /// # Errors
    ///
    /// Will return `Err` on a blank course, a missing score, counters that overflow when
    /// summed or a non-ISO date.
    pub fn validate(&self) -> Result<NaiveDate, ValidationError> {
        if self.course.trim().is_empty() {
            return Err(ValidationError::MissingCourse);
        }
        if self.total_score.is_none() {
            return Err(ValidationError::MissingTotalScore);
        }
        if crate::metrics::tiger_five_of(&self.counters).is_none() {
            return Err(ValidationError::CounterOverflow);
        }
        NaiveDate::parse_from_str(self.date.trim(), DATE_FORMAT)
            .map_err(|_| ValidationError::InvalidDate(self.date.clone()))
    }
}

/// Counter fields accept anything; junk and negatives count as zero.
#[must_use]
pub fn parse_counter(raw: &str) -> u32 {
    raw.trim().parse::<u32>().unwrap_or(0)
}

/// Empty or unparsable means no score was entered.
#[must_use]
pub fn parse_total_score(raw: &str) -> Option<i32> {
    raw.trim().parse::<i32>().ok()
}
