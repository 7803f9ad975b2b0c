//! Element Module - Headless document the bindings run against.
//!
//! Cells synchronize against elements, not against a browser: this module
//! models the handful of element features the bindings track (tag, id,
//! classes, attributes, form value, checked/disabled, select options, inner
//! content, inline display, `input`/`change` listeners) in an in-crate store,
//! so every binding path is exercisable in native tests. A wasm embedding
//! mirrors tracked properties onto real nodes from a cell watcher.
//!
//! Selector support is a deliberate subset: `tag`, `#id`, `.class`, compound
//! forms like `input.big#name`, and comma-separated lists. Resolution is
//! always one-shot; callers re-query if they want fresh matches.
//!
//! # Example
//!
//! ```
//! use filament::dom::{Document, EventKind};
//!
//! let doc = Document::new();
//! let input = doc.create_element("input");
//! input.set_id("name");
//!
//! assert!(doc.query("#name").is_some());
//! input.on(EventKind::Input, |el| println!("value now {}", el.value()));
//! input.set_value("Ada");
//! input.dispatch(EventKind::Input);
//! ```

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use tracing::warn;

// =============================================================================
// TYPES
// =============================================================================

/// The two element events the bindings listen to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum EventKind {
    Input,
    Change,
}

/// One option of a select element.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectOption {
    pub value: String,
    pub selected: bool,
}

impl SelectOption {
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            selected: false,
        }
    }

    pub fn selected(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
            selected: true,
        }
    }
}

type Listener = Rc<dyn Fn(&Element)>;

struct Node {
    tag: String,
    id: Option<String>,
    classes: Vec<String>,
    attrs: HashMap<String, String>,
    value: String,
    checked: bool,
    disabled: bool,
    multiple: bool,
    options: Vec<SelectOption>,
    /// One content store backs both `text()` and `inner_html()`; a headless
    /// model has no markup tree to distinguish them.
    content: String,
    display: Option<String>,
    listeners: HashMap<EventKind, Vec<Listener>>,
}

// =============================================================================
// ELEMENT
// =============================================================================

/// Shared handle to one element. Clones refer to the same node; equality is
/// handle identity.
#[derive(Clone)]
pub struct Element {
    node: Rc<RefCell<Node>>,
}

impl PartialEq for Element {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.node, &other.node)
    }
}

impl fmt::Debug for Element {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let node = self.node.borrow();
        write!(f, "<{}", node.tag)?;
        if let Some(id) = &node.id {
            write!(f, " id={id}")?;
        }
        write!(f, ">")
    }
}

impl Element {
    fn new(tag: &str) -> Self {
        Self {
            node: Rc::new(RefCell::new(Node {
                tag: tag.to_ascii_lowercase(),
                id: None,
                classes: Vec::new(),
                attrs: HashMap::new(),
                value: String::new(),
                checked: false,
                disabled: false,
                multiple: false,
                options: Vec::new(),
                content: String::new(),
                display: None,
                listeners: HashMap::new(),
            })),
        }
    }

    pub fn tag(&self) -> String {
        self.node.borrow().tag.clone()
    }

    pub fn id(&self) -> Option<String> {
        self.node.borrow().id.clone()
    }

    pub fn set_id(&self, id: impl Into<String>) {
        self.node.borrow_mut().id = Some(id.into());
    }

    pub fn attr(&self, name: &str) -> Option<String> {
        self.node.borrow().attrs.get(name).cloned()
    }

    pub fn set_attr(&self, name: impl Into<String>, value: impl Into<String>) {
        self.node.borrow_mut().attrs.insert(name.into(), value.into());
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.node.borrow().classes.iter().any(|c| c == class)
    }

    pub fn add_class(&self, class: &str) {
        let mut node = self.node.borrow_mut();
        if !node.classes.iter().any(|c| c == class) {
            node.classes.push(class.to_string());
        }
    }

    pub fn remove_class(&self, class: &str) {
        self.node.borrow_mut().classes.retain(|c| c != class);
    }

    /// Add or remove in one call; idempotent either way.
    pub fn set_class_present(&self, class: &str, present: bool) {
        if present {
            self.add_class(class);
        } else {
            self.remove_class(class);
        }
    }

    pub fn value(&self) -> String {
        self.node.borrow().value.clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.node.borrow_mut().value = value.into();
    }

    pub fn checked(&self) -> bool {
        self.node.borrow().checked
    }

    pub fn set_checked(&self, checked: bool) {
        self.node.borrow_mut().checked = checked;
    }

    pub fn disabled(&self) -> bool {
        self.node.borrow().disabled
    }

    pub fn set_disabled(&self, disabled: bool) {
        self.node.borrow_mut().disabled = disabled;
    }

    pub fn multiple(&self) -> bool {
        self.node.borrow().multiple
    }

    pub fn set_multiple(&self, multiple: bool) {
        self.node.borrow_mut().multiple = multiple;
    }

    pub fn options(&self) -> Vec<SelectOption> {
        self.node.borrow().options.clone()
    }

    pub fn set_options(&self, options: Vec<SelectOption>) {
        self.node.borrow_mut().options = options;
    }

    /// Values of the currently selected options, in option order.
    pub fn selected_values(&self) -> Vec<String> {
        self.node
            .borrow()
            .options
            .iter()
            .filter(|o| o.selected)
            .map(|o| o.value.clone())
            .collect()
    }

    pub fn text(&self) -> String {
        self.node.borrow().content.clone()
    }

    pub fn set_text(&self, text: impl Into<String>) {
        self.node.borrow_mut().content = text.into();
    }

    pub fn inner_html(&self) -> String {
        self.node.borrow().content.clone()
    }

    pub fn set_inner_html(&self, html: impl Into<String>) {
        self.node.borrow_mut().content = html.into();
    }

    /// Inline display value; `None` when unset.
    pub fn display(&self) -> Option<String> {
        self.node.borrow().display.clone()
    }

    pub fn set_display(&self, display: impl Into<String>) {
        self.node.borrow_mut().display = Some(display.into());
    }

    /// Register a listener for `kind`; listeners run in registration order.
    pub fn on(&self, kind: EventKind, listener: impl Fn(&Element) + 'static) {
        self.on_shared(kind, Rc::new(listener));
    }

    pub(crate) fn on_shared(&self, kind: EventKind, listener: Listener) {
        self.node
            .borrow_mut()
            .listeners
            .entry(kind)
            .or_default()
            .push(listener);
    }

    /// Synchronous dispatch to every listener of `kind`.
    pub fn dispatch(&self, kind: EventKind) {
        let listeners = self
            .node
            .borrow()
            .listeners
            .get(&kind)
            .cloned()
            .unwrap_or_default();
        for listener in listeners {
            listener(self);
        }
    }

    /// Whether the element matches a selector from the supported subset.
    /// Unsupported syntax matches nothing.
    pub fn matches(&self, selector: &str) -> bool {
        selector
            .split(',')
            .filter_map(parse_simple)
            .any(|simple| self.matches_simple(&simple))
    }

    fn matches_simple(&self, selector: &SimpleSelector) -> bool {
        let node = self.node.borrow();
        if let Some(tag) = &selector.tag {
            if node.tag != *tag {
                return false;
            }
        }
        if let Some(id) = &selector.id {
            if node.id.as_deref() != Some(id.as_str()) {
                return false;
            }
        }
        selector
            .classes
            .iter()
            .all(|class| node.classes.iter().any(|c| c == class))
    }
}

// =============================================================================
// SELECTORS
// =============================================================================

#[derive(Default)]
struct SimpleSelector {
    tag: Option<String>,
    id: Option<String>,
    classes: Vec<String>,
}

/// Parse one simple selector (`tag`, `#id`, `.class` or a compound of them).
/// Returns `None` for anything outside the subset.
fn parse_simple(selector: &str) -> Option<SimpleSelector> {
    let selector = selector.trim();
    if selector.is_empty() {
        return None;
    }

    let mut simple = SimpleSelector::default();
    let mut rest = selector;

    let cut = rest.find(['#', '.']).unwrap_or(rest.len());
    if cut > 0 {
        let tag = &rest[..cut];
        if !tag.chars().all(|c| c.is_ascii_alphanumeric() || c == '-') {
            return None;
        }
        simple.tag = Some(tag.to_ascii_lowercase());
    }
    rest = &rest[cut..];

    while !rest.is_empty() {
        let marker = rest.as_bytes()[0];
        rest = &rest[1..];
        let cut = rest.find(['#', '.']).unwrap_or(rest.len());
        let name = &rest[..cut];
        if name.is_empty() || !name.chars().all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_') {
            return None;
        }
        match marker {
            b'#' => {
                if simple.id.is_some() {
                    return None;
                }
                simple.id = Some(name.to_string());
            }
            b'.' => simple.classes.push(name.to_string()),
            _ => return None,
        }
        rest = &rest[cut..];
    }

    Some(simple)
}

// =============================================================================
// DOCUMENT
// =============================================================================

#[derive(Default)]
struct DocumentState {
    elements: Vec<Element>,
}

/// Insertion-ordered element store standing in for the page. Cheaply
/// clonable handle.
#[derive(Clone, Default)]
pub struct Document {
    state: Rc<RefCell<DocumentState>>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an element and append it to the document.
    pub fn create_element(&self, tag: &str) -> Element {
        let element = Element::new(tag);
        self.state.borrow_mut().elements.push(element.clone());
        element
    }

    /// All elements matching `selector`, in document order. An unsupported
    /// selector logs a warning and matches nothing; a miss is a non-event.
    pub fn query_all(&self, selector: &str) -> Vec<Element> {
        if selector.split(',').all(|s| parse_simple(s).is_none()) {
            warn!(selector, "unsupported selector; matches nothing");
            return Vec::new();
        }
        self.state
            .borrow()
            .elements
            .iter()
            .filter(|el| el.matches(selector))
            .cloned()
            .collect()
    }

    /// First element matching `selector`, if any.
    pub fn query(&self, selector: &str) -> Option<Element> {
        self.query_all(selector).into_iter().next()
    }
}

// =============================================================================
// Tests
// =============================================================================
