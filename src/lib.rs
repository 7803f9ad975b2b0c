//! # filament
//!
//! Reactive state cells with two-way element bindings.
//!
//! State lives in cells; elements and derived values hang off them. Every
//! mutation runs one synchronous pipeline, while memo recomputes and effect
//! reruns are batched through a per-scope scheduler:
//!
//! ```text
//! set/update → element sync → set-watchers → change-watchers
//!                                               │ (change channel)
//!                                               ▼
//!                                    scheduler batch ── flush ──► memos, effects
//! ```
//!
//! Everything is created through a [`Scope`], the explicit context that owns
//! the document, the scheduler and the registry of created state. There are
//! no globals; two scopes never interact.
//!
//! ## Modules
//!
//! - [`scope`] - Construction context (`use_state`, `use_memo`, `use_effect`, `use_button`)
//! - [`cell`] - Observable value with set and change notification channels
//! - [`derived`] - Memoized values recomputed from dependencies
//! - [`button`] - Disabled/loading/visibility state projected onto buttons
//! - [`value`] - Dynamic value type with structural deep equality
//! - [`scheduler`] - Job coalescing and the flush cycle
//! - [`dom`] - Headless document model and the binding layer
//!
//! ## Quick start
//!
//! ```
//! use filament::{Scope, Value};
//!
//! let ui = Scope::new();
//! let input = ui.document().create_element("input");
//! input.set_id("name");
//!
//! let name = ui.use_state("", "#name");
//! let greeting = {
//!     let dep = name.dep();
//!     let name = name.clone();
//!     ui.use_memo(move || format!("Hello, {}!", name.get()), dep)
//! };
//!
//! name.set(Value::from("Ada"));
//! assert_eq!(input.value(), "Ada");
//! ui.flush();
//! assert_eq!(greeting.get(), "Hello, Ada!");
//! ```

pub mod button;
pub mod cell;
pub mod derived;
pub mod dom;
mod effect;
pub mod runner;
pub mod scheduler;
pub mod scope;
pub mod value;

pub use button::{Button, ButtonOptions, ButtonState};
pub use cell::{Cell, Dep, IntoDeps, SetEvent};
pub use derived::Derived;
pub use dom::{Document, DomRef, Element, ElementKind, EventKind, IntoDomRefs, SelectOption};
pub use runner::Cleanup;
pub use scheduler::{JobId, Scheduler};
pub use scope::Scope;
pub use value::{Value, deep_equal};
