//! Shared Tokio runtime for the async mistral.rs backend
//!
//! Everything else in mermaid-core is synchronous. Async model calls are
//! driven to completion here so callers keep a blocking interface.

use anyhow::{Context, Result};
use once_cell::sync::OnceCell;
use std::future::Future;
use std::sync::Arc;
use tokio::runtime::{Handle, Runtime};

/// Runtime registered by a host (e.g. the FFI layer)
static GLOBAL_RUNTIME: OnceCell<Arc<Runtime>> = OnceCell::new();

/// Register a Tokio runtime for use by mermaid-core
///
/// Only the first registration wins. Without one, each call builds a
/// temporary runtime.
pub fn register_runtime(runtime: Arc<Runtime>) {
    if GLOBAL_RUNTIME.set(runtime).is_ok() {
        tracing::debug!("Global Tokio runtime registered with mermaid-core");
    }
}

/// Block the current thread on `future`
///
/// Uses the registered runtime when there is one. Calls made from inside a
/// Tokio context run on a scoped helper thread, since runtimes cannot nest.
pub fn block_on<F, T>(future: F) -> Result<T>
where
    F: Future<Output = Result<T>> + Send,
    T: Send,
{
    let inside_runtime = Handle::try_current().is_ok();

    match (GLOBAL_RUNTIME.get(), inside_runtime) {
        (Some(rt), false) => rt.block_on(future),
        (Some(rt), true) => {
            let rt = Arc::clone(rt);
            run_on_helper_thread(move || rt.block_on(future))
        }
        (None, true) => run_on_helper_thread(move || temporary_runtime()?.block_on(future)),
        (None, false) => temporary_runtime()?.block_on(future),
    }
}

fn temporary_runtime() -> Result<Runtime> {
    tracing::debug!("No global runtime registered, creating a temporary one");
    Runtime::new().context("Failed to create Tokio runtime")
}

fn run_on_helper_thread<T, W>(work: W) -> Result<T>
where
    W: FnOnce() -> Result<T> + Send,
    T: Send,
{
    std::thread::scope(|s| {
        s.spawn(work)
            .join()
            .map_err(|_| anyhow::anyhow!("Runtime helper thread panicked"))?
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_on_without_runtime() {
        let value = block_on(async { Ok(21 * 2) }).unwrap();
        assert_eq!(value, 42);
    }

    #[test]
    fn test_block_on_propagates_errors() {
        let err = block_on(async { Err::<(), _>(anyhow::anyhow!("boom")) }).unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[tokio::test]
    async fn test_block_on_inside_runtime() {
        let value = block_on(async { Ok("nested") }).unwrap();
        assert_eq!(value, "nested");
    }
}
