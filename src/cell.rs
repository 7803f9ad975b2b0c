//! State Cell Module - Observable value with two notification channels.
//!
//! A [`Cell`] holds one reactive value and tells two kinds of subscribers
//! about mutations:
//!
//! - **Set-watchers** fire on *every* mutation attempt, change or not, and
//!   receive a [`SetEvent`] carrying the new value and a `has_change` flag.
//! - **Change-watchers** fire only when the new value is structurally
//!   different from the old one.
//!
//! Storage is always overwritten, even when the new value compares equal, so
//! updaters always see the most recent write. A watcher may return a
//! [`Cleanup`]; it is invoked exactly once, immediately before that watcher's
//! next run, with panics isolated. There is no teardown hook, so a cleanup
//! pending when the cell is dropped never runs.
//!
//! Within one `set`: bound elements re-sync first, then set-watchers in
//! registration order, then (if changed) change-watchers in registration
//! order. Watcher panics are isolated per watcher and never reach the `set`
//! caller.
//!
//! # Example
//!
//! ```
//! use filament::{Scope, Value};
//!
//! let ui = Scope::new();
//! let counter = ui.use_state(0, ());
//!
//! counter.watch(|event| {
//!     println!("set to {} (changed: {})", event.value, event.has_change);
//!     None
//! });
//!
//! counter.set(Value::from(5));
//! assert_eq!(counter.get().as_i64(), Some(5));
//! let next = counter.update(|v| Value::from(v.as_i64().unwrap_or(0) + 1));
//! assert_eq!(next.as_i64(), Some(6));
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use tracing::warn;

use crate::runner::{self, Cleanup};

// =============================================================================
// WATCHERS
// =============================================================================

/// Payload delivered to set-watchers on every mutation attempt.
#[derive(Clone, Debug)]
pub struct SetEvent<T> {
    /// The value after the mutation.
    pub value: T,
    /// Whether the value is structurally different from the previous one.
    pub has_change: bool,
}

pub(crate) struct Watcher<A> {
    callback: Box<dyn FnMut(A) -> Option<Cleanup>>,
    cleanup: Option<Cleanup>,
}

/// Shared watcher slot: the notification pass iterates a cloned handle list,
/// so watchers registered mid-pass join the next pass.
pub(crate) type WatcherSlot<A> = Rc<RefCell<Watcher<A>>>;

pub(crate) fn new_slot<A>(
    callback: impl FnMut(A) -> Option<Cleanup> + 'static,
) -> WatcherSlot<A> {
    Rc::new(RefCell::new(Watcher {
        callback: Box::new(callback),
        cleanup: None,
    }))
}

/// Run one watcher: pending cleanup first, then the callback, both isolated.
/// A watcher whose own run triggers itself again is skipped with a warning.
pub(crate) fn fire<A>(slot: &WatcherSlot<A>, context: &'static str, arg: A) {
    let Ok(mut watcher) = slot.try_borrow_mut() else {
        warn!(context, "watcher re-entered during its own run; skipping");
        return;
    };
    let pending = watcher.cleanup.take();
    runner::run_cleanup(context, pending);
    watcher.cleanup = runner::run_guarded(context, || (watcher.callback)(arg)).flatten();
}

// =============================================================================
// CELL
// =============================================================================

struct CellState<T> {
    value: T,
    set_watchers: Vec<WatcherSlot<SetEvent<T>>>,
    change_watchers: Vec<WatcherSlot<T>>,
    /// Library subscriptions (scheduler wiring); run after user watchers.
    set_taps: Vec<Rc<dyn Fn()>>,
    change_taps: Vec<Rc<dyn Fn()>>,
    /// Element synchronizers, run before any watcher.
    syncers: Vec<Rc<dyn Fn(&T)>>,
}

/// Observable holder of one reactive value. Cheaply clonable handle; clones
/// share the same state and watcher lists.
///
/// Created through [`Scope::use_state`](crate::Scope::use_state),
/// [`Scope::use_cell`](crate::Scope::use_cell) or
/// [`Scope::use_button`](crate::Scope::use_button).
pub struct Cell<T> {
    state: Rc<RefCell<CellState<T>>>,
}

impl<T> Clone for Cell<T> {
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T: Clone + PartialEq + 'static> Cell<T> {
    pub(crate) fn new(initial: T) -> Self {
        Self {
            state: Rc::new(RefCell::new(CellState {
                value: initial,
                set_watchers: Vec::new(),
                change_watchers: Vec::new(),
                set_taps: Vec::new(),
                change_taps: Vec::new(),
                syncers: Vec::new(),
            })),
        }
    }

    /// Current value, cloned.
    pub fn get(&self) -> T {
        self.state.borrow().value.clone()
    }

    /// Borrowed read without cloning.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.state.borrow().value)
    }

    /// Replace the value and run the notification pipeline. Returns the new
    /// value.
    pub fn set(&self, value: T) -> T {
        self.apply(value)
    }

    /// Compute the next value from the current one, then behave like
    /// [`set`](Self::set). The updater receives a clone and holds no borrow,
    /// so it may freely use the cell; its result is what gets stored.
    pub fn update(&self, f: impl FnOnce(&T) -> T) -> T {
        let current = self.get();
        let next = f(&current);
        self.apply(next)
    }

    /// Register a set-watcher and run it immediately once with
    /// `has_change = false`.
    pub fn watch(&self, callback: impl FnMut(SetEvent<T>) -> Option<Cleanup> + 'static) {
        let slot = new_slot(callback);
        self.state.borrow_mut().set_watchers.push(slot.clone());
        let value = self.get();
        fire(
            &slot,
            "set watcher",
            SetEvent {
                value,
                has_change: false,
            },
        );
    }

    /// Register a change-watcher. When `run_immediately`, it also runs once
    /// right away with the current value; otherwise it first runs on the
    /// first real change.
    pub fn watch_effect(
        &self,
        callback: impl FnMut(T) -> Option<Cleanup> + 'static,
        run_immediately: bool,
    ) {
        let slot = new_slot(callback);
        self.state.borrow_mut().change_watchers.push(slot.clone());
        if run_immediately {
            let value = self.get();
            fire(&slot, "change watcher", value);
        }
    }

    /// Erased change-channel subscription handle for dependency lists.
    pub fn dep(&self) -> Dep {
        Dep::from(self)
    }

    pub(crate) fn tap_set(&self, listener: Rc<dyn Fn()>) {
        self.state.borrow_mut().set_taps.push(listener);
    }

    pub(crate) fn tap_change(&self, listener: Rc<dyn Fn()>) {
        self.state.borrow_mut().change_taps.push(listener);
    }

    pub(crate) fn add_syncer(&self, syncer: Rc<dyn Fn(&T)>) {
        self.state.borrow_mut().syncers.push(syncer);
    }

    fn apply(&self, next: T) -> T {
        let (has_change, syncers, set_watchers, set_taps, change_watchers, change_taps) = {
            let mut state = self.state.borrow_mut();
            let has_change = state.value != next;
            // Always overwrite, even when structurally equal.
            state.value = next.clone();
            (
                has_change,
                state.syncers.clone(),
                state.set_watchers.clone(),
                state.set_taps.clone(),
                state.change_watchers.clone(),
                state.change_taps.clone(),
            )
        };

        for syncer in &syncers {
            syncer(&next);
        }
        for slot in &set_watchers {
            fire(
                slot,
                "set watcher",
                SetEvent {
                    value: next.clone(),
                    has_change,
                },
            );
        }
        for tap in &set_taps {
            tap();
        }
        if has_change {
            for slot in &change_watchers {
                fire(slot, "change watcher", next.clone());
            }
            for tap in &change_taps {
                tap();
            }
        }
        next
    }
}

// =============================================================================
// DEPENDENCY HANDLES
// =============================================================================

/// Type-erased subscription handle used in dependency lists for
/// [`Scope::use_memo`](crate::Scope::use_memo) and
/// [`Scope::use_effect`](crate::Scope::use_effect).
///
/// A handle from a [`Cell`] subscribes its change channel; a handle from a
/// [`Derived`](crate::Derived) subscribes its (only) notify channel.
#[derive(Clone)]
pub struct Dep {
    subscribe: Rc<dyn Fn(Rc<dyn Fn()>)>,
}

impl Dep {
    pub(crate) fn new(subscribe: impl Fn(Rc<dyn Fn()>) + 'static) -> Self {
        Self {
            subscribe: Rc::new(subscribe),
        }
    }

    pub(crate) fn subscribe(&self, listener: Rc<dyn Fn()>) {
        (self.subscribe)(listener);
    }
}

impl<T: Clone + PartialEq + 'static> From<&Cell<T>> for Dep {
    fn from(cell: &Cell<T>) -> Self {
        let cell = cell.clone();
        Dep::new(move |listener| cell.tap_change(listener))
    }
}

/// Uniform dependency declaration: a single cell, a single handle, or a list.
pub trait IntoDeps {
    fn into_deps(self) -> Vec<Dep>;
}

impl IntoDeps for Dep {
    fn into_deps(self) -> Vec<Dep> {
        vec![self]
    }
}

impl IntoDeps for Vec<Dep> {
    fn into_deps(self) -> Vec<Dep> {
        self
    }
}

impl<const N: usize> IntoDeps for [Dep; N] {
    fn into_deps(self) -> Vec<Dep> {
        self.into()
    }
}

impl<T: Clone + PartialEq + 'static> IntoDeps for &Cell<T> {
    fn into_deps(self) -> Vec<Dep> {
        vec![Dep::from(self)]
    }
}

// =============================================================================
// Tests
// =============================================================================
