mod common;

use crate::common::{pebble, round_input};
use tiger_five::storage::{
    DARK_MODE_KEY, KeyValueStore, MemoryKvStore, ROUND_LOG_KEY, SqliteKvStore,
};
use tiger_five::{GoalStatus, Round, RoundStore, TrackerError, ValidationError};

fn assert_tiger_five_invariant(rounds: &[Round]) {
    for r in rounds {
        let c = r.counters();
        assert_eq!(
            r.tiger_five(),
            c.double_bogey_or_worse + c.bogey_on_par5 + c.three_putts + c.bogey_inside150 + c.missed_easy_saves
        );
    }
}

#[test]
fn test1_append_derives_tiger_five() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RoundStore::load(MemoryKvStore::new());
    let round = store.append(&pebble())?;

    assert_eq!(round.tiger_five(), 4);
    assert_eq!(round.goal_status(), GoalStatus::Met);
    assert_eq!(round.bad_drives(), 3);
    assert_eq!(round.course(), "Pebble");
    assert_eq!(round.total_score(), 80);
    assert_eq!(store.len(), 1);
    assert!(!store.is_processing());
    Ok(())
}

#[test]
fn test1_newest_round_goes_first_with_unique_ids() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RoundStore::load(MemoryKvStore::new());
    let first = store.append(&round_input("2024-01-01", "Pebble", 80, [0; 5], 0))?;
    let second = store.append(&round_input("2024-01-02", "Spyglass", 85, [3, 2, 1, 1, 1], 0))?;
    let third = store.append(&round_input("2024-01-03", "Links", 78, [0, 0, 1, 0, 0], 4))?;

    let ids: Vec<i64> = store.rounds().iter().map(Round::id).collect();
    assert_eq!(ids, vec![third.id(), second.id(), first.id()]);
    assert!(third.id() > second.id() && second.id() > first.id());
    assert_eq!(second.goal_status(), GoalStatus::Above);
    assert_tiger_five_invariant(store.rounds());
    Ok(())
}

#[test]
fn test1_empty_course_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RoundStore::load(MemoryKvStore::new());
    store.append(&pebble())?;

    let mut input = pebble();
    input.course = String::new();
    let err = store.append(&input).unwrap_err();
    assert!(matches!(err, TrackerError::Validation(ValidationError::MissingCourse)));

    input.course = "   ".to_string();
    assert!(matches!(
        store.append(&input),
        Err(TrackerError::Validation(ValidationError::MissingCourse))
    ));
    assert_eq!(store.len(), 1);
    assert_eq!(store.kv().get_json::<Vec<Round>>(ROUND_LOG_KEY)?.map(|r| r.len()), Some(1));
    Ok(())
}

#[test]
fn test1_missing_score_and_bad_date_are_rejected() {
    let mut store = RoundStore::load(MemoryKvStore::new());

    let mut input = pebble();
    input.total_score = None;
    assert!(matches!(
        store.append(&input),
        Err(TrackerError::Validation(ValidationError::MissingTotalScore))
    ));

    let mut input = pebble();
    input.date = "01/02/2024".to_string();
    assert!(matches!(
        store.append(&input),
        Err(TrackerError::Validation(ValidationError::InvalidDate(_)))
    ));

    assert!(store.is_empty());
    assert!(!store.is_processing());
    assert!(store.kv().get(ROUND_LOG_KEY).unwrap().is_none());
}

#[test]
fn test1_zero_total_score_is_accepted() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RoundStore::load(MemoryKvStore::new());
    let round = store.append(&round_input("2024-03-01", "Par 3 course", 0, [0; 5], 0))?;
    assert_eq!(round.total_score(), 0);
    Ok(())
}

#[test]
fn test1_log_survives_reopen() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rounds.db");

    let saved = {
        let mut store = RoundStore::load(SqliteKvStore::open(&path)?);
        store.append(&pebble())?;
        store.append(&round_input("2024-01-08", "Torrey", 90, [2, 1, 3, 1, 2], 5))?;
        store.rounds().to_vec()
    };

    let reopened = RoundStore::load(SqliteKvStore::open(&path)?);
    assert_eq!(reopened.rounds(), saved.as_slice());
    assert_eq!(reopened.rounds()[0].course(), "Torrey");
    assert_tiger_five_invariant(reopened.rounds());
    Ok(())
}

#[test]
fn test1_unreadable_log_starts_empty() -> Result<(), Box<dyn std::error::Error>> {
    let mut kv = MemoryKvStore::new();
    kv.put(ROUND_LOG_KEY, "{not json")?;
    let mut store = RoundStore::load(kv);
    assert!(store.is_empty());

    // the next write replaces the broken value
    store.append(&pebble())?;
    assert_eq!(store.kv().get_json::<Vec<Round>>(ROUND_LOG_KEY)?.map(|r| r.len()), Some(1));
    Ok(())
}

#[test]
fn test1_tampered_tiger_five_is_treated_as_corrupt() -> Result<(), Box<dyn std::error::Error>> {
    let mut kv = MemoryKvStore::new();
    kv.put(
        ROUND_LOG_KEY,
        r#"[{"id":1,"date":"2024-01-01","course":"Pebble","totalScore":80,
            "doubleBogeyOrWorse":1,"bogeyOnPar5":0,"threePutts":2,"bogeyInside150":1,
            "missedEasySaves":0,"badDrives":3,"tigerFive":2}]"#,
    )?;
    assert!(RoundStore::load(kv).is_empty());
    Ok(())
}

#[test]
fn test1_counters_too_large_to_sum_are_rejected() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RoundStore::load(MemoryKvStore::new());
    let input = round_input("2024-01-01", "Pebble", 80, [u32::MAX, 1, 0, 0, 0], 0);

    assert!(matches!(
        store.append(&input),
        Err(TrackerError::Validation(ValidationError::CounterOverflow))
    ));
    assert!(store.is_empty());
    assert!(!store.is_processing());
    assert!(store.kv().get(ROUND_LOG_KEY)?.is_none());

    // the largest sum that still fits is a valid round
    let round = store.append(&round_input("2024-01-01", "Pebble", 80, [u32::MAX, 0, 0, 0, 0], 0))?;
    assert_eq!(round.tiger_five(), u32::MAX);
    Ok(())
}

#[test]
fn test1_stored_counters_that_overflow_are_treated_as_corrupt() -> Result<(), Box<dyn std::error::Error>> {
    let mut kv = MemoryKvStore::new();
    kv.put(
        ROUND_LOG_KEY,
        r#"[{"id":1,"date":"2024-01-01","course":"Pebble","totalScore":80,
            "doubleBogeyOrWorse":4294967295,"bogeyOnPar5":1,"threePutts":0,"bogeyInside150":0,
            "missedEasySaves":0,"badDrives":0,"tigerFive":0}]"#,
    )?;
    let mut store = RoundStore::load(kv);
    assert!(store.is_empty());

    store.append(&pebble())?;
    assert_eq!(store.kv().get_json::<Vec<Round>>(ROUND_LOG_KEY)?.map(|r| r.len()), Some(1));
    Ok(())
}

#[test]
fn test1_stored_shape_uses_camel_case_keys() -> Result<(), Box<dyn std::error::Error>> {
    let mut store = RoundStore::load(MemoryKvStore::new());
    store.append(&pebble())?;

    let raw = store.kv().get(ROUND_LOG_KEY)?.unwrap_or_default();
    let value: serde_json::Value = serde_json::from_str(&raw)?;
    let first = &value[0];
    assert_eq!(first["date"], "2024-01-01");
    assert_eq!(first["totalScore"], 80);
    assert_eq!(first["doubleBogeyOrWorse"], 1);
    assert_eq!(first["threePutts"], 2);
    assert_eq!(first["bogeyInside150"], 1);
    assert_eq!(first["badDrives"], 3);
    assert_eq!(first["tigerFive"], 4);
    Ok(())
}

#[test]
fn test1_clear_empties_memory_and_storage() -> Result<(), Box<dyn std::error::Error>> {
    let dir = tempfile::tempdir()?;
    let path = dir.path().join("rounds.db");

    let mut store = RoundStore::load(SqliteKvStore::open(&path)?);
    store.append(&pebble())?;
    store.append(&pebble())?;
    assert_eq!(store.clear()?, 2);
    assert!(store.is_empty());
    assert_eq!(store.kv().get(ROUND_LOG_KEY)?.as_deref(), Some("[]"));
    drop(store);

    assert!(RoundStore::load(SqliteKvStore::open(&path)?).is_empty());
    Ok(())
}

#[test]
fn test1_sqlite_kv_put_replaces_and_remove_deletes() -> Result<(), Box<dyn std::error::Error>> {
    let mut kv = SqliteKvStore::open_in_memory()?;
    assert_eq!(kv.get(DARK_MODE_KEY)?, None);
    kv.put(DARK_MODE_KEY, "false")?;
    kv.put(DARK_MODE_KEY, "true")?;
    assert_eq!(kv.get_json::<bool>(DARK_MODE_KEY)?, Some(true));
    kv.remove(DARK_MODE_KEY)?;
    assert_eq!(kv.get(DARK_MODE_KEY)?, None);
    Ok(())
}
