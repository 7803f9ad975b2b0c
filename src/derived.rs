//! Derived Value Module - Memoized value recomputed from dependencies.
//!
//! A [`Derived`] stores the result of a zero-argument factory and recomputes
//! it when any declared dependency reports a change. Recomputes are routed
//! through the scope's [`Scheduler`](crate::Scheduler), so several synchronous
//! dependency mutations coalesce into one recompute per flush.
//!
//! There is no change gating at this layer: every dependency-triggered
//! recompute notifies all local watchers, whether or not the factory produced
//! a different result. Downstream change gating, when wanted, belongs in a
//! cell.
//!
//! # Example
//!
//! ```
//! use filament::{Scope, Value};
//!
//! let ui = Scope::new();
//! let first = ui.use_state("Ada", ());
//! let last = ui.use_state("Lovelace", ());
//!
//! let full = {
//!     let deps = vec![first.dep(), last.dep()];
//!     let (first, last) = (first.clone(), last.clone());
//!     ui.use_memo(
//!         move || format!("{} {}", first.get(), last.get()),
//!         deps,
//!     )
//! };
//! assert_eq!(full.get(), "Ada Lovelace");
//!
//! first.set(Value::from("Grace"));
//! ui.flush();
//! assert_eq!(full.get(), "Grace Lovelace");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::cell::{Dep, IntoDeps, WatcherSlot, fire, new_slot};
use crate::runner::{self, Cleanup};

// =============================================================================
// DERIVED
// =============================================================================

struct DerivedState<T> {
    /// `None` only if the factory panicked on the initial compute.
    value: Option<T>,
    watchers: Vec<WatcherSlot<T>>,
    /// Library subscriptions; fire on every recompute, like the watchers.
    taps: Vec<Rc<dyn Fn()>>,
}

/// Read-only memoized value. Cheaply clonable handle.
///
/// Created through [`Scope::use_memo`](crate::Scope::use_memo).
pub struct Derived<T> {
    state: Rc<RefCell<DerivedState<T>>>,
}

impl<T> Clone for Derived<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + 'static> Derived<T> {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(DerivedState {
                value: None,
                watchers: Vec::new(),
                taps: Vec::new(),
            })),
        }
    }

    /// Current memoized value, cloned.
    ///
    /// # Panics
    ///
    /// If the factory panicked on the initial compute, there is no value to
    /// return and this panics with a diagnostic.
    pub fn get(&self) -> T {
        self.state
            .borrow()
            .value
            .clone()
            .expect("derived value unavailable: factory panicked during initial compute")
    }

    /// Borrowed read without cloning. Panics like [`get`](Self::get) when no
    /// initial value exists.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        let state = self.state.borrow();
        let value = state
            .value
            .as_ref()
            .expect("derived value unavailable: factory panicked during initial compute");
        f(value)
    }

    /// Register a watcher and run it immediately with the current value.
    /// Watchers re-run on every recompute, with the usual cleanup-before-rerun
    /// discipline.
    pub fn watch(&self, callback: impl FnMut(T) -> Option<Cleanup> + 'static) {
        let slot = new_slot(callback);
        self.state.borrow_mut().watchers.push(slot.clone());
        let value = self.get();
        fire(&slot, "derived watcher", value);
    }

    /// Erased subscription handle. A derived exposes a single notify channel
    /// (no change gating), which is what dependency lists fall back to.
    pub fn dep(&self) -> Dep {
        let derived = self.clone();
        Dep::new(move |listener| derived.tap(listener))
    }

    pub(crate) fn tap(&self, listener: Rc<dyn Fn()>) {
        self.state.borrow_mut().taps.push(listener);
    }

    /// Run the factory (isolated; the previous value is retained on panic),
    /// store the result, and notify every watcher and tap unconditionally.
    pub(crate) fn recompute(&self, factory: &Rc<dyn Fn() -> T>) {
        let Some(next) = runner::run_guarded("derived factory", || factory()) else {
            return;
        };
        let (watchers, taps) = {
            let mut state = self.state.borrow_mut();
            state.value = Some(next.clone());
            (state.watchers.clone(), state.taps.clone())
        };
        for slot in &watchers {
            fire(slot, "derived watcher", next.clone());
        }
        for tap in &taps {
            tap();
        }
    }
}

impl<T: Clone + 'static> From<&Derived<T>> for Dep {
    fn from(derived: &Derived<T>) -> Self {
        derived.dep()
    }
}

impl<T: Clone + 'static> IntoDeps for &Derived<T> {
    fn into_deps(self) -> Vec<Dep> {
        vec![self.dep()]
    }
}

// =============================================================================
// Tests
// =============================================================================
