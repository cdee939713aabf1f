//! Trigger intake: the vacancy-closure event worker.

mod closure_worker;

pub use closure_worker::{ClosureHandle, ClosureWorkerConfig, VacancyClosureWorker};
