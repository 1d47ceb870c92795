//! Synchronous connection driver.

mod worker;

pub use worker::{Worker, WorkerHandle};
