//! Global Async Runtime
//!
//! Drive calls are async. Commands run one at a time on the caller's thread
//! and drive those calls to completion here before touching the library
//! again.

use once_cell::sync::Lazy;
use tokio::runtime::Runtime;

/// Global shared Tokio runtime, built on first use
pub static RUNTIME: Lazy<Runtime> = Lazy::new(|| {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_all()
        .build()
        .expect("Failed to create Tokio runtime")
});

/// Run a future to completion (blocking the current thread)
///
/// Must not be called from inside an async context.
pub fn block_on<F: std::future::Future>(future: F) -> F::Output {
    RUNTIME.block_on(future)
}
