pub mod config;
pub mod logging;

pub mod control;
pub mod idx;
pub mod item;
pub mod manifest;
pub mod queue;
pub mod retry;
pub mod scheduler;
pub mod stats;
pub mod storage;
pub mod store;
pub mod transfer;

pub use control::{CancelSignals, ShutdownHandle};
pub use item::{ByteRange, WorkItem};
pub use scheduler::{EnqueueError, FinalReport, Scheduler, SchedulerOptions};
pub use transfer::{transfer, TransferOutcome};
