//! DOM Module - Headless element model and the cell↔element binding layer.
//!
//! [`element`] holds the document/element store the bindings run against;
//! [`bind`] classifies elements and wires the two-way synchronization used by
//! [`Scope::use_state`](crate::Scope::use_state).

pub mod bind;
pub mod element;

pub use bind::{DomRef, ElementKind, IntoDomRefs};
pub use element::{Document, Element, EventKind, SelectOption};
