pub mod args;
pub mod error;
pub mod export;
pub mod metrics;
pub mod model;
pub mod remote;
pub mod series;
pub mod storage;
pub mod store;

pub use error::{RemoteError, StorageError, TrackerError, ValidationError};
pub use model::{GOAL_THRESHOLD, GoalStatus, Metric, MistakeCounters, Round, RoundInput};
pub use remote::{RemoteConfig, RemoteSync};
pub use store::RoundStore;
