use std::fs;
use std::path::Path;

use crate::error::StorageError;
use crate::model::{DATE_FORMAT, Round};

pub const CSV_HEADER: &str = "Date,Course,Total Score,Tiger Five,Double Bogey+,Bogey Par 5,3-Putts,Bogey <150y,Missed Saves,Bad Drives";

pub const DEFAULT_EXPORT_FILE: &str = "tiger-five-golf-data.csv";

/// Header plus one line per round, in log order. Lines are joined with `\n`, no trailing newline.
/// Fields go out verbatim, without quoting.
#[must_use]
pub fn to_csv(rounds: &[Round]) -> String {
    let mut lines = Vec::with_capacity(rounds.len() + 1);
    lines.push(CSV_HEADER.to_string());
    for round in rounds {
        let c = round.counters();
        lines.push(format!(
            "{},{},{},{},{},{},{},{},{},{}",
            round.date().format(DATE_FORMAT),
            round.course(),
            round.total_score(),
            round.tiger_five(),
            c.double_bogey_or_worse,
            c.bogey_on_par5,
            c.three_putts,
            c.bogey_inside150,
            c.missed_easy_saves,
            round.bad_drives(),
        ));
    }
    lines.join("\n")
}

/// # Errors
///
/// Will return `Err` if the file cannot be written
pub fn write_csv(path: &Path, rounds: &[Round]) -> Result<(), StorageError> {
    fs::write(path, to_csv(rounds))?;
    tracing::info!(path = %path.display(), rounds = rounds.len(), "exported csv");
    Ok(())
}
