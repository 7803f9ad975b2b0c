//! Scope Module - Construction context for cells, memos, effects and buttons.
//!
//! A [`Scope`] owns the pieces every reactive primitive needs: the document
//! the bindings resolve against, the scheduler that batches derived
//! recomputes and effect reruns, and the registry of everything created
//! through it (which is what `use_effect` falls back to when no dependency
//! list is given). There is no ambient global; two scopes are fully
//! independent, and everything is wired explicitly through the scope handle.
//!
//! # Example
//!
//! ```
//! use filament::{Scope, Value};
//!
//! let ui = Scope::new();
//! let input = ui.document().create_element("input");
//! input.set_id("name");
//!
//! let name = ui.use_state("", "#name");
//! name.set(Value::from("Ada"));
//! assert_eq!(input.value(), "Ada");
//! ```

use std::cell::RefCell;
use std::rc::Rc;

use crate::button::{Button, ButtonOptions, ButtonState};
use crate::cell::{Cell, Dep, IntoDeps};
use crate::derived::Derived;
use crate::dom::bind::{self, IntoDomRefs};
use crate::dom::element::Document;
use crate::effect;
use crate::runner::Cleanup;
use crate::scheduler::Scheduler;
use crate::value::Value;

// =============================================================================
// SCOPE
// =============================================================================

struct ScopeState {
    document: Document,
    scheduler: Scheduler,
    /// Change-channel handles of everything created through this scope, in
    /// creation order.
    registry: RefCell<Vec<Dep>>,
}

/// Cheaply clonable handle to one reactive scope.
#[derive(Clone)]
pub struct Scope {
    state: Rc<ScopeState>,
}

impl Default for Scope {
    fn default() -> Self {
        Self::new()
    }
}

impl Scope {
    /// Scope with a fresh empty document.
    pub fn new() -> Self {
        Self::with_document(Document::new())
    }

    /// Scope resolving its bindings against an existing document.
    pub fn with_document(document: Document) -> Self {
        Self {
            state: Rc::new(ScopeState {
                document,
                scheduler: Scheduler::new(),
                registry: RefCell::new(Vec::new()),
            }),
        }
    }

    pub fn document(&self) -> &Document {
        &self.state.document
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.state.scheduler
    }

    /// Run the scheduler batch: pending memo recomputes and effect reruns.
    /// Returns the number of jobs run.
    pub fn flush(&self) -> usize {
        self.state.scheduler.flush()
    }

    /// Install the host hook invoked whenever a batch arms; the host responds
    /// by arranging one deferred [`flush`](Self::flush).
    pub fn set_waker(&self, waker: impl Fn() + 'static) {
        self.state.scheduler.set_waker(waker);
    }

    fn register(&self, dep: Dep) {
        self.state.registry.borrow_mut().push(dep);
    }

    // =========================================================================
    // FACTORIES
    // =========================================================================

    /// Typed cell with no element binding.
    pub fn use_cell<T: Clone + PartialEq + 'static>(&self, initial: T) -> Cell<T> {
        let cell = Cell::new(initial);
        self.register(cell.dep());
        cell
    }

    /// [`Value`] cell bound two-way to every element `refs` resolves to.
    /// Resolution, classification and the initial element sync happen here,
    /// once.
    pub fn use_state(&self, initial: impl Into<Value>, refs: impl IntoDomRefs) -> Cell<Value> {
        let cell = self.use_cell(initial.into());
        bind::bind_value_cell(&self.state.document, &cell, refs.into_dom_refs());
        cell
    }

    /// Memoized value recomputed (through the scheduler) when any dependency
    /// reports a change. The factory runs once synchronously before this
    /// returns.
    pub fn use_memo<T, F>(&self, factory: F, deps: impl IntoDeps) -> Derived<T>
    where
        T: Clone + 'static,
        F: Fn() -> T + 'static,
    {
        let derived = Derived::new();
        let factory: Rc<dyn Fn() -> T> = Rc::new(factory);

        let id = self.state.scheduler.job_id();
        let job: Rc<dyn Fn()> = {
            let derived = derived.clone();
            let factory = factory.clone();
            Rc::new(move || derived.recompute(&factory))
        };
        let trigger: Rc<dyn Fn()> = {
            let scheduler = self.state.scheduler.clone();
            Rc::new(move || scheduler.schedule(id, job.clone()))
        };
        for dep in deps.into_deps() {
            dep.subscribe(trigger.clone());
        }

        derived.recompute(&factory);
        self.register(derived.dep());
        derived
    }

    /// Effect running once now and once per flush in which a dependency
    /// changed. `deps: None` tracks everything created through this scope so
    /// far; `Some(vec![])` pins the effect to its single mount run.
    pub fn use_effect(
        &self,
        callback: impl FnMut() -> Option<Cleanup> + 'static,
        deps: Option<Vec<Dep>>,
    ) {
        let deps = deps.unwrap_or_else(|| self.state.registry.borrow().clone());
        effect::register(&self.state.scheduler, callback, deps);
    }

    /// Button-state cell rendered onto every element `refs` resolves to.
    pub fn use_button(&self, refs: impl IntoDomRefs, options: ButtonOptions) -> Button {
        let cell = self.use_cell(ButtonState::default());
        crate::button::bind_button(&self.state.document, &cell, refs.into_dom_refs(), options);
        Button::new(cell)
    }
}

// =============================================================================
// Tests
// =============================================================================
