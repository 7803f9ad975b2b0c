//! Binding Module - Two-way synchronization between cells and elements.
//!
//! Binding happens once, at cell construction: refs resolve to a fixed
//! element set, each element is classified into an [`ElementKind`] (cached
//! for the life of the binding, no repeated type probing), synchronized from
//! the initial value, and wired so its `input`/`change` events push the
//! extracted value into the cell.
//!
//! Element writes are idempotent: a value already current is not rewritten,
//! which is what keeps the element → state → element path from feeding back.
//!
//! Kind mapping:
//!
//! - checkbox ↔ truthiness via the checked state
//! - radio group ↔ selected value (`Null` when none checked); members are
//!   resolved once, at bind time
//! - multi-select ↔ list of selected option values
//! - other form controls ↔ string via the value property
//! - anything else ↔ string via text content

use std::rc::Rc;

use tracing::debug;

use crate::cell::Cell;
use crate::value::Value;

use super::element::{Document, Element, EventKind, SelectOption};

// =============================================================================
// ELEMENT REFS
// =============================================================================

/// One element reference: a handle or a one-shot selector.
#[derive(Clone, Debug)]
pub enum DomRef {
    Element(Element),
    Selector(String),
}

/// Uniform ref declaration: nothing, a selector, an element, or a list.
pub trait IntoDomRefs {
    fn into_dom_refs(self) -> Vec<DomRef>;
}

impl IntoDomRefs for () {
    fn into_dom_refs(self) -> Vec<DomRef> {
        Vec::new()
    }
}

impl IntoDomRefs for &str {
    fn into_dom_refs(self) -> Vec<DomRef> {
        vec![DomRef::Selector(self.to_string())]
    }
}

impl IntoDomRefs for String {
    fn into_dom_refs(self) -> Vec<DomRef> {
        vec![DomRef::Selector(self)]
    }
}

impl IntoDomRefs for Element {
    fn into_dom_refs(self) -> Vec<DomRef> {
        vec![DomRef::Element(self)]
    }
}

impl IntoDomRefs for DomRef {
    fn into_dom_refs(self) -> Vec<DomRef> {
        vec![self]
    }
}

impl IntoDomRefs for Vec<DomRef> {
    fn into_dom_refs(self) -> Vec<DomRef> {
        self
    }
}

impl<const N: usize> IntoDomRefs for [DomRef; N] {
    fn into_dom_refs(self) -> Vec<DomRef> {
        self.into()
    }
}

/// Resolve refs against the document, once. Selector misses are non-events;
/// duplicates (same element matched twice) are dropped.
pub(crate) fn resolve(document: &Document, refs: Vec<DomRef>) -> Vec<Element> {
    let mut elements: Vec<Element> = Vec::new();
    let mut push_unique = |el: Element| {
        if !elements.contains(&el) {
            elements.push(el);
        }
    };
    for dom_ref in refs {
        match dom_ref {
            DomRef::Element(el) => push_unique(el),
            DomRef::Selector(selector) => {
                for el in document.query_all(&selector) {
                    push_unique(el);
                }
            }
        }
    }
    elements
}

// =============================================================================
// ELEMENT KINDS
// =============================================================================

/// Closed set of binding behaviors, resolved once at bind time.
#[derive(Clone, Debug)]
pub enum ElementKind {
    Checkbox,
    /// All radios sharing this element's `name`, captured at bind time.
    RadioGroup { members: Vec<Element> },
    MultiSelect,
    TextControl,
    Generic,
}

pub(crate) fn classify(document: &Document, element: &Element) -> ElementKind {
    match element.tag().as_str() {
        "input" => match element.attr("type").as_deref() {
            Some("checkbox") => ElementKind::Checkbox,
            Some("radio") => ElementKind::RadioGroup {
                members: radio_group(document, element),
            },
            _ => ElementKind::TextControl,
        },
        "select" if element.multiple() => ElementKind::MultiSelect,
        "select" | "textarea" => ElementKind::TextControl,
        _ => ElementKind::Generic,
    }
}

fn radio_group(document: &Document, element: &Element) -> Vec<Element> {
    let mut members: Vec<Element> = match element.attr("name") {
        Some(name) => document
            .query_all("input")
            .into_iter()
            .filter(|el| {
                el.attr("type").as_deref() == Some("radio")
                    && el.attr("name").as_deref() == Some(name.as_str())
            })
            .collect(),
        None => Vec::new(),
    };
    if !members.contains(element) {
        members.push(element.clone());
    }
    members
}

// =============================================================================
// EXTRACTION AND SYNC
// =============================================================================

#[derive(Clone)]
pub(crate) struct BoundElement {
    pub(crate) element: Element,
    pub(crate) kind: ElementKind,
}

/// Read the element's current state as a [`Value`].
pub(crate) fn extract(binding: &BoundElement) -> Value {
    match &binding.kind {
        ElementKind::Checkbox => Value::Bool(binding.element.checked()),
        ElementKind::RadioGroup { members } => members
            .iter()
            .find(|m| m.checked())
            .map(|m| Value::Str(m.value()))
            .unwrap_or(Value::Null),
        ElementKind::MultiSelect => Value::List(
            binding
                .element
                .selected_values()
                .into_iter()
                .map(Value::Str)
                .collect(),
        ),
        ElementKind::TextControl => Value::Str(binding.element.value()),
        ElementKind::Generic => Value::Str(binding.element.text()),
    }
}

/// Write `value` into the element, skipping writes that would not change it.
pub(crate) fn sync(binding: &BoundElement, value: &Value) {
    let element = &binding.element;
    match &binding.kind {
        ElementKind::Checkbox => {
            if !matches!(value, Value::Null | Value::Bool(_)) {
                debug!(kind = value.kind(), "non-boolean value driving a checkbox; using truthiness");
            }
            let want = value.is_truthy();
            if element.checked() != want {
                element.set_checked(want);
            }
        }
        ElementKind::RadioGroup { members } => {
            let target = match value {
                Value::Null => None,
                other => Some(other.to_string()),
            };
            for member in members {
                let want = target.as_deref() == Some(member.value().as_str());
                if member.checked() != want {
                    member.set_checked(want);
                }
            }
        }
        ElementKind::MultiSelect => {
            let wanted = selection_set(value);
            let current = element.options();
            let next: Vec<SelectOption> = current
                .iter()
                .map(|o| SelectOption {
                    value: o.value.clone(),
                    selected: wanted.iter().any(|w| *w == o.value),
                })
                .collect();
            if next != current {
                element.set_options(next);
            }
        }
        ElementKind::TextControl => {
            let want = value.to_string();
            if element.value() != want {
                element.set_value(want);
            }
        }
        ElementKind::Generic => {
            let want = value.to_string();
            if element.text() != want {
                element.set_text(want);
            }
        }
    }
}

/// The option values a multi-select should mark selected for `value`.
fn selection_set(value: &Value) -> Vec<String> {
    match value {
        Value::Null => Vec::new(),
        Value::List(items) => items.iter().map(|v| v.to_string()).collect(),
        other => vec![other.to_string()],
    }
}

/// Attach every resolved element to the cell: initial sync, syncer
/// registration, and `input`/`change` wiring back into `set`.
pub(crate) fn bind_value_cell(document: &Document, cell: &Cell<Value>, refs: Vec<DomRef>) {
    for element in resolve(document, refs) {
        let binding = BoundElement {
            kind: classify(document, &element),
            element,
        };
        sync(&binding, &cell.get());
        {
            let binding = binding.clone();
            cell.add_syncer(Rc::new(move |value: &Value| sync(&binding, value)));
        }
        let handler: Rc<dyn Fn(&Element)> = {
            let cell = cell.clone();
            let binding = binding.clone();
            Rc::new(move |_| {
                cell.set(extract(&binding));
            })
        };
        binding.element.on_shared(EventKind::Input, handler.clone());
        binding.element.on_shared(EventKind::Change, handler);
    }
}

// =============================================================================
// Tests
// =============================================================================
