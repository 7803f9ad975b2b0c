//! Effect Runner Module - Isolated execution of user callbacks.
//!
//! Watchers, effect bodies, derived factories and their cleanups are user
//! code. A panic in any of them must never reach the `set` caller or prevent
//! sibling watchers from running, so every invocation goes through this
//! module: the panic is caught, reported through `tracing`, and swallowed.
//!
//! Hosts control verbosity with whatever `tracing` subscriber they install;
//! the crate only emits.

use std::any::Any;
use std::panic::{AssertUnwindSafe, catch_unwind};

use tracing::error;

/// Teardown returned by a watcher or effect callback. Invoked exactly once,
/// immediately before that callback's next run.
pub type Cleanup = Box<dyn FnOnce()>;

/// Run `f`, isolating a panic. Returns `None` when `f` panicked.
///
/// `context` labels the call site in diagnostics ("set watcher",
/// "effect callback", ...).
pub(crate) fn run_guarded<T>(context: &str, f: impl FnOnce() -> T) -> Option<T> {
    match catch_unwind(AssertUnwindSafe(f)) {
        Ok(value) => Some(value),
        Err(payload) => {
            error!(context, panic = %panic_message(payload.as_ref()), "user callback panicked; isolated");
            None
        }
    }
}

/// Run a pending cleanup, if any, with the same isolation as `run_guarded`.
pub(crate) fn run_cleanup(context: &str, cleanup: Option<Cleanup>) {
    if let Some(cleanup) = cleanup {
        run_guarded(context, cleanup);
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&'static str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell as StdCell;
    use std::rc::Rc;

    #[test]
    fn test_run_guarded_returns_value() {
        assert_eq!(run_guarded("test", || 41 + 1), Some(42));
    }

    #[test]
    fn test_run_guarded_swallows_panic() {
        let result: Option<i32> = run_guarded("test", || panic!("boom"));
        assert_eq!(result, None);
    }

    #[test]
    fn test_run_guarded_swallows_string_panic() {
        let result: Option<()> = run_guarded("test", || panic!("{}", String::from("owned")));
        assert_eq!(result, None);
    }

    #[test]
    fn test_run_cleanup_invokes_present_cleanup() {
        let ran = Rc::new(StdCell::new(false));
        let flag = ran.clone();
        run_cleanup("test", Some(Box::new(move || flag.set(true))));
        assert!(ran.get());
    }

    #[test]
    fn test_run_cleanup_ignores_absent_cleanup() {
        run_cleanup("test", None);
    }

    #[test]
    fn test_run_cleanup_swallows_panic() {
        run_cleanup("test", Some(Box::new(|| panic!("cleanup boom"))));
        // Reaching this line is the assertion.
    }
}
