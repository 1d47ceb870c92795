//! Asynchronous connection driver using Tokio.

mod worker;

pub use worker::{Worker, WorkerHandle};
