//! Blocking-call offload.
//!
//! HTTP calls go through `reqwest`'s blocking client.  [`offload`] runs
//! such a call on a short-lived worker thread and parks the calling task
//! on an `embassy-sync` [`Signal`] until the result arrives, so the
//! executor keeps driving the other checker tasks in the meantime.

use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;

use embassy_sync::blocking_mutex::raw::CriticalSectionRawMutex;
use embassy_sync::signal::Signal;
use log::warn;

type Completion<T> = Signal<CriticalSectionRawMutex, Option<T>>;

/// Run `f` on a worker thread named `name` and await its result.
///
/// Returns `None` if the worker could not be spawned or panicked.
pub async fn offload<T, F>(name: &'static str, f: F) -> Option<T>
where
    T: Send + 'static,
    F: FnOnce() -> T + Send + 'static,
{
    let done: Arc<Completion<T>> = Arc::new(Signal::new());
    let tx = Arc::clone(&done);

    let spawned = std::thread::Builder::new().name(name.into()).spawn(move || {
        tx.signal(catch_unwind(AssertUnwindSafe(f)).ok());
    });

    if let Err(e) = spawned {
        warn!("offload '{}': worker spawn failed: {}", name, e);
        return None;
    }

    done.wait().await
}
