use chrono::Utc;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::error::TrackerError;
use crate::model::{Round, RoundInput};
use crate::remote::RemoteSync;
use crate::storage::{KeyValueStore, ROUND_LOG_KEY};

/// Set while a submission (including its mirror call, up to the submit timeout) is in flight.
#[derive(Clone, Default)]
struct ProcessingFlag(Arc<AtomicBool>);

impl ProcessingFlag {
    fn acquire(&self) -> Option<ProcessingGuard> {
        if self.0.swap(true, Ordering::AcqRel) {
            None
        } else {
            Some(ProcessingGuard(Arc::clone(&self.0)))
        }
    }

    fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

struct ProcessingGuard(Arc<AtomicBool>);

impl Drop for ProcessingGuard {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Owns the round log, newest first, and writes the whole of it back after every change.
pub struct RoundStore<S: KeyValueStore> {
    kv: S,
    rounds: Vec<Round>,
    mirror: Option<RemoteSync>,
    processing: ProcessingFlag,
    pending: Vec<JoinHandle<()>>,
}

impl<S: KeyValueStore> RoundStore<S> {
    /// Restores the log from `kv`. A missing or unreadable log starts out empty.
    pub fn load(kv: S) -> Self {
        let rounds = match kv.get_json::<Vec<Round>>(ROUND_LOG_KEY) {
            Ok(Some(rounds)) => {
                debug!(rounds = rounds.len(), "round log restored");
                rounds
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!(error = %e, "stored round log unreadable, starting empty");
                Vec::new()
            }
        };
        Self {
            kv,
            rounds,
            mirror: None,
            processing: ProcessingFlag::default(),
            pending: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_mirror(mut self, mirror: RemoteSync) -> Self {
        self.mirror = Some(mirror);
        self
    }

    #[must_use]
    pub fn mirror(&self) -> Option<&RemoteSync> {
        self.mirror.as_ref()
    }

    #[must_use]
    pub fn rounds(&self) -> &[Round] {
        &self.rounds
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.rounds.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.rounds.is_empty()
    }

    #[must_use]
    pub fn kv(&self) -> &S {
        &self.kv
    }

    #[must_use]
    pub fn is_processing(&self) -> bool {
        self.processing.is_set()
    }

    /// Creation time in millis, bumped past the newest id when the clock has not moved on.
    fn next_id(&self) -> i64 {
        let now = Utc::now().timestamp_millis();
        match self.rounds.first() {
            Some(newest) if newest.id() >= now => newest.id() + 1,
            _ => now,
        }
    }

    /// Validates and saves a new round at the front of the log, then hands it to the mirror.
    ///
    /// # Errors
    ///
    /// Will return `Err` if another submission is still in flight, the input is invalid,
    /// or the log cannot be written. The log is unchanged in all three cases.
    pub fn append(&mut self, input: &RoundInput) -> Result<Round, TrackerError> {
        self.pending.retain(|h| !h.is_finished());
        let guard = self.processing.acquire().ok_or(TrackerError::Busy)?;

        info!(course = %input.course, "Saving round data...");
        let round = Round::from_input(self.next_id(), input)?;

        let mut next = Vec::with_capacity(self.rounds.len() + 1);
        next.push(round.clone());
        next.extend(self.rounds.iter().cloned());
        self.kv.put_json(ROUND_LOG_KEY, &next)?;
        self.rounds = next;
        info!(
            round_id = round.id(),
            tiger_five = round.tiger_five(),
            status = round.goal_status().label(),
            "round saved"
        );

        if let Some(mirror) = &self.mirror {
            if let Some(handle) = mirror.spawn_submit(round.clone(), guard) {
                self.pending.push(handle);
            }
        }
        Ok(round)
    }

    /// Empties the log and persists that, then asks the mirror to delete every round it held
    /// once pending mirror work is done. Returns how many rounds were removed.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the empty log cannot be written; the log is unchanged then.
    pub fn clear(&mut self) -> Result<usize, TrackerError> {
        self.kv.put_json(ROUND_LOG_KEY, &Vec::<Round>::new())?;
        let removed = std::mem::take(&mut self.rounds);
        info!(rounds = removed.len(), "round log cleared");

        if let Some(mirror) = &self.mirror {
            let ids = removed.iter().map(Round::id).collect::<Vec<_>>();
            if !ids.is_empty() {
                // deletes wait for any submit still in flight
                let earlier = std::mem::take(&mut self.pending);
                if let Some(handle) = mirror.spawn_delete_all(ids, earlier) {
                    self.pending.push(handle);
                }
            }
        }
        Ok(removed.len())
    }

    /// Waits for outstanding mirror work. Local state never depends on this.
    pub async fn settle(&mut self) {
        for handle in self.pending.drain(..) {
            if let Err(e) = handle.await {
                warn!(error = %e, "mirror task did not finish");
            }
        }
    }
}
