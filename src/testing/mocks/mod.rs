//! Mock implementations of the runner's outside services

pub mod enricher;
pub mod generator;
pub mod sender;
pub mod sentlog;

pub use enricher::MockEnricher;
pub use generator::{MockGenerator, MockGeneratorBuilder};
pub use sender::{MockMailSender, MockMailSenderBuilder, SentMessage};
pub use sentlog::UnwritableSentLog;

use std::sync::{Arc, Mutex, MutexGuard};

pub(crate) fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

fn bump(count: &Arc<Mutex<usize>>) -> usize {
    let mut count = lock(count);
    *count += 1;
    *count
}
