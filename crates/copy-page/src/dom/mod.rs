//! The seam between the button logic and the page it runs in.
//!
//! Everything the mounter, extractor, clipboard writer and feedback presenter need from
//! a document goes through [`Dom`]. The browser bindings implement it over `web-sys`;
//! [`MemoryDocument`] implements it over an in-memory tree.
pub mod memory;

use std::fmt;
use std::rc::Rc;

pub use memory::{MemoryDocument, NodeId};

/// Elements whose first newline is dropped by the HTML parser. Serializers must emit an
/// extra newline when their text starts with one, or a re-parse loses it.
pub const LEADING_NEWLINE_ELEMENTS: &[&str] = &["pre", "textarea", "listing"];

/// Event handler registered through [`Dom::add_listener`].
pub type Listener = Rc<dyn Fn()>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ReadyState {
    Loading,
    Interactive,
    #[default]
    Complete,
}

impl ReadyState {
    /// Maps `document.readyState`. Unknown values are treated as complete.
    pub fn from_document_state(state: &str) -> Self {
        match state {
            "loading" => ReadyState::Loading,
            "interactive" => ReadyState::Interactive,
            _ => ReadyState::Complete,
        }
    }
}

pub trait Dom {
    type Node: Clone + PartialEq + fmt::Debug + 'static;

    /// First element in document order matching `selectors`.
    fn query_selector(&self, selectors: &str) -> Option<Self::Node>;
    /// First descendant of `scope` matching `selectors`.
    fn query_selector_in(&self, scope: &Self::Node, selectors: &str) -> Option<Self::Node>;
    /// `node` itself or its nearest ancestor matching `selectors`.
    fn closest(&self, node: &Self::Node, selectors: &str) -> Option<Self::Node>;

    /// A new detached element, or `None` when the host rejects `tag_name`.
    fn create_element(&self, tag_name: &str) -> Option<Self::Node>;
    fn set_attribute(&self, node: &Self::Node, name: &str, value: &str);
    fn add_class(&self, node: &Self::Node, class: &str);
    fn remove_class(&self, node: &Self::Node, class: &str);
    fn set_text_content(&self, node: &Self::Node, text: &str);
    fn set_inner_html(&self, node: &Self::Node, html: &str);
    fn text_content(&self, node: &Self::Node) -> String;
    /// Markup for `node` that parses back to the same tree, including the leading newline of
    /// [`LEADING_NEWLINE_ELEMENTS`].
    fn outer_html(&self, node: &Self::Node) -> String;

    /// Inserts `node` as the previous sibling of `reference`, moving it if attached elsewhere.
    fn insert_before(&self, reference: &Self::Node, node: &Self::Node);
    /// Appends `child` to `parent`, moving it if attached elsewhere.
    fn append_child(&self, parent: &Self::Node, child: &Self::Node);
    /// Detaches `node` from its parent. Detached nodes are left alone.
    fn remove(&self, node: &Self::Node);

    fn body(&self) -> Option<Self::Node>;
    /// The document title, whitespace-collapsed.
    fn title(&self) -> String;
    fn ready_state(&self) -> ReadyState;

    fn computed_opacity(&self, node: &Self::Node) -> f64;
    /// Flushes pending style so a following class change animates.
    fn force_layout(&self, node: &Self::Node);

    fn add_listener(&self, node: &Self::Node, event: &str, listener: Listener);
    fn add_document_listener(&self, event: &str, listener: Listener, once: bool);
}
