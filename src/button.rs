//! Button Module - Disabled/loading/visibility state projected onto buttons.
//!
//! A [`Button`] is a [`Cell`] of [`ButtonState`] with element rendering
//! attached: every state write re-renders each bound element, idempotently.
//! Loading implies the native disabled attribute, so a spinner never leaves a
//! clickable button behind; the original content is captured once at bind time
//! and restored when loading ends.
//!
//! # Example
//!
//! ```
//! use filament::{ButtonOptions, Scope};
//!
//! let ui = Scope::new();
//! let el = ui.document().create_element("button");
//! el.set_id("save");
//! el.set_inner_html("Save");
//!
//! let save = ui.use_button("#save", ButtonOptions::default());
//! save.loading(true);
//! assert!(el.disabled());
//! save.loading(false);
//! assert_eq!(el.inner_html(), "Save");
//! ```

use std::ops::Deref;
use std::rc::Rc;

use crate::cell::Cell;
use crate::dom::bind::{DomRef, resolve};
use crate::dom::element::{Document, Element};

// =============================================================================
// TYPES
// =============================================================================

/// Snapshot of a button's interaction state.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ButtonState {
    pub disabled: bool,
    pub loading: bool,
    /// Whether the button is shown at all.
    pub display: bool,
}

impl Default for ButtonState {
    fn default() -> Self {
        Self {
            disabled: false,
            loading: false,
            display: true,
        }
    }
}

/// Rendering knobs for bound buttons.
#[derive(Clone, Debug)]
pub struct ButtonOptions {
    /// Replacement content while loading; `None` keeps the captured content.
    pub loading_html: Option<String>,
    /// Markup prepended to the content while loading, e.g. a spinner.
    pub loading_icon: String,
    pub loading_class: String,
    pub disabled_class: String,
    pub shown_class: String,
    pub hidden_class: String,
    /// Inline display value used when the button is shown.
    pub display: String,
}

impl Default for ButtonOptions {
    fn default() -> Self {
        Self {
            loading_html: None,
            loading_icon: String::new(),
            loading_class: "is-loading".to_string(),
            disabled_class: "is-disabled".to_string(),
            shown_class: "is-shown".to_string(),
            hidden_class: "is-hidden".to_string(),
            display: "inline-block".to_string(),
        }
    }
}

struct ButtonBinding {
    element: Element,
    /// Content at bind time, restored whenever loading ends.
    default_content: String,
    options: ButtonOptions,
}

// =============================================================================
// RENDERING
// =============================================================================

/// Project `state` onto the bound element. Every write is guarded by a read,
/// so rendering the same state twice touches nothing.
fn render(binding: &ButtonBinding, state: &ButtonState) {
    let el = &binding.element;
    let opts = &binding.options;

    let display = if state.display {
        opts.display.clone()
    } else {
        "none".to_string()
    };
    if el.display().as_deref() != Some(display.as_str()) {
        el.set_display(display);
    }
    el.set_class_present(&opts.shown_class, state.display);
    el.set_class_present(&opts.hidden_class, !state.display);

    // Loading always disables natively, whatever the disabled flag says.
    let disabled = state.disabled || state.loading;
    if el.disabled() != disabled {
        el.set_disabled(disabled);
    }
    el.set_class_present(&opts.disabled_class, disabled);
    el.set_class_present(&opts.loading_class, state.loading);

    let content = if state.loading {
        let body = opts
            .loading_html
            .as_deref()
            .unwrap_or(&binding.default_content);
        format!("{}{}", opts.loading_icon, body)
    } else {
        binding.default_content.clone()
    };
    if el.inner_html() != content {
        el.set_inner_html(content);
    }
}

/// Resolve refs, capture each element's content, render the initial state,
/// and keep rendering on every state write.
pub(crate) fn bind_button(
    document: &Document,
    cell: &Cell<ButtonState>,
    refs: Vec<DomRef>,
    options: ButtonOptions,
) {
    for element in resolve(document, refs) {
        let binding = ButtonBinding {
            default_content: element.inner_html(),
            element,
            options: options.clone(),
        };
        render(&binding, &cell.get());
        cell.add_syncer(Rc::new(move |state: &ButtonState| {
            render(&binding, state);
        }));
    }
}

// =============================================================================
// BUTTON
// =============================================================================

/// Cell of [`ButtonState`] with convenience mutators. Derefs to the cell, so
/// `get`, `watch` and `dep` work directly.
///
/// Created through [`Scope::use_button`](crate::Scope::use_button).
#[derive(Clone)]
pub struct Button {
    cell: Cell<ButtonState>,
}

impl Button {
    pub(crate) fn new(cell: Cell<ButtonState>) -> Self {
        Self { cell }
    }

    pub fn disabled(&self, on: bool) {
        self.cell.update(|state| ButtonState {
            disabled: on,
            ..*state
        });
    }

    /// Entering loading also sets the disabled flag; leaving it clears both.
    pub fn loading(&self, on: bool) {
        self.cell.update(|state| ButtonState {
            loading: on,
            disabled: on,
            ..*state
        });
    }

    pub fn show(&self, on: bool) {
        self.cell.update(|state| ButtonState {
            display: on,
            ..*state
        });
    }

    pub fn hide(&self, on: bool) {
        self.show(!on);
    }
}

impl Deref for Button {
    type Target = Cell<ButtonState>;

    fn deref(&self) -> &Self::Target {
        &self.cell
    }
}

// =============================================================================
// Tests
// =============================================================================
