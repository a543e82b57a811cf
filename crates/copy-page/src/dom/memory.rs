use std::cell::{Cell, RefCell};
use std::fmt;
use std::io;

use copy_page_markdown::parser;
use ego_tree::iter::Edge;
use ego_tree::{NodeMut, NodeRef};
use html5ever::serialize::{Serialize, SerializeOpts, Serializer, TraversalScope};
use html5ever::{Attribute, LocalName, QualName, ns};
use itertools::Itertools;
use scraper::node::{Element, Text};
use scraper::{CaseSensitivity, ElementRef, Html, Node, Selector, StrTendril};

pub use ego_tree::NodeId;

use super::{Dom, LEADING_NEWLINE_ELEMENTS, Listener, ReadyState};

type Attributes = Vec<(QualName, StrTendril)>;

struct RegisteredListener {
    /// `None` for listeners on the document itself.
    target: Option<NodeId>,
    event: String,
    listener: Listener,
    once: bool,
}

/// An in-memory document implementing [`Dom`] over a scraper tree.
///
/// Removed nodes stay in the tree as orphans, so a removed node keeps a valid handle.
/// Listeners only fire through [`MemoryDocument::dispatch`] and
/// [`MemoryDocument::dispatch_document`]; opacity comes from a small stylesheet of
/// `(selector, opacity)` rules where the last match wins.
pub struct MemoryDocument {
    html: RefCell<Html>,
    listeners: RefCell<Vec<RegisteredListener>>,
    ready_state: Cell<ReadyState>,
    opacity_rules: RefCell<Vec<(Selector, f64)>>,
    layout_flushes: Cell<usize>,
}

impl fmt::Debug for MemoryDocument {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MemoryDocument")
            .field("nodes", &self.html.borrow().tree.nodes().count())
            .field("listeners", &self.listeners.borrow().len())
            .field("ready_state", &self.ready_state.get())
            .finish()
    }
}

impl Default for MemoryDocument {
    fn default() -> Self {
        Self::from_html(Html::new_document())
    }
}

impl MemoryDocument {
    /// Parses a full HTML document.
    pub fn parse(html: &str) -> Self {
        Self::from_html(Html::parse_document(html))
    }

    fn from_html(html: Html) -> Self {
        let document = Self {
            html: RefCell::new(html),
            listeners: RefCell::new(Vec::new()),
            ready_state: Cell::new(ReadyState::Complete),
            opacity_rules: RefCell::new(Vec::new()),
            layout_flushes: Cell::new(0),
        };

        document.add_opacity_rule(".sl-copy-button-feedback", 0.0);
        document.add_opacity_rule(".sl-copy-button-feedback.show", 1.0);
        document
    }

    pub fn set_ready_state(&self, state: ReadyState) {
        self.ready_state.set(state);
    }

    /// Adds a stylesheet rule consulted by [`Dom::computed_opacity`].
    pub fn add_opacity_rule(&self, selectors: &str, opacity: f64) {
        if let Some(selector) = parse_selector(selectors) {
            self.opacity_rules.borrow_mut().push((selector, opacity));
        }
    }

    /// Every connected element matching `selectors`, in document order.
    pub fn query_selector_all(&self, selectors: &str) -> Vec<NodeId> {
        let Some(selector) = parse_selector(selectors) else {
            return Vec::new();
        };
        let html = self.html.borrow();

        html.tree
            .root()
            .descendants()
            .filter_map(ElementRef::wrap)
            .filter(|element| selector.matches(element))
            .map(|element| element.id())
            .collect()
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.html
            .borrow()
            .tree
            .get(node)?
            .parent()
            .map(|parent| parent.id())
    }

    pub fn attribute(&self, node: NodeId, name: &str) -> Option<String> {
        self.html
            .borrow()
            .tree
            .get(node)?
            .value()
            .as_element()?
            .attr(name)
            .map(str::to_string)
    }

    pub fn has_class(&self, node: NodeId, class: &str) -> bool {
        let html = self.html.borrow();

        html.tree
            .get(node)
            .and_then(|node| node.value().as_element())
            .is_some_and(|element| element.has_class(class, CaseSensitivity::CaseSensitive))
    }

    /// Whether `node` is reachable from the document root.
    pub fn is_connected(&self, node: NodeId) -> bool {
        let html = self.html.borrow();
        let root = html.tree.root().id();

        html.tree
            .get(node)
            .is_some_and(|node| node.id() == root || node.ancestors().any(|a| a.id() == root))
    }

    /// Serializes the whole document.
    pub fn html(&self) -> String {
        to_markup(
            self.html.borrow().tree.root(),
            TraversalScope::ChildrenOnly(None),
        )
    }

    /// Fires `event` on `node`, bubbling to its ancestors and then the document.
    pub fn dispatch(&self, node: NodeId, event: &str) {
        let path = {
            let html = self.html.borrow();
            let Some(target) = html.tree.get(node) else {
                return;
            };
            std::iter::once(target)
                .chain(target.ancestors())
                .map(|node| Some(node.id()))
                .collect::<Vec<_>>()
        };

        for target in path.into_iter().chain([None]) {
            self.fire(target, event);
        }
    }

    /// Fires `event` on the document only.
    pub fn dispatch_document(&self, event: &str) {
        self.fire(None, event);
    }

    /// Number of registered listeners for `event` across all targets.
    pub fn listener_count(&self, event: &str) -> usize {
        self.listeners
            .borrow()
            .iter()
            .filter(|registered| registered.event == event)
            .count()
    }

    /// How many times [`Dom::force_layout`] was called.
    pub fn layout_flush_count(&self) -> usize {
        self.layout_flushes.get()
    }

    fn fire(&self, target: Option<NodeId>, event: &str) {
        let matched = {
            let mut listeners = self.listeners.borrow_mut();
            let matched = listeners
                .iter()
                .filter(|registered| registered.target == target && registered.event == event)
                .map(|registered| registered.listener.clone())
                .collect::<Vec<_>>();
            listeners.retain(|registered| {
                !(registered.once && registered.target == target && registered.event == event)
            });
            matched
        };

        // Listeners may touch the document, so no borrow is held while they run.
        for listener in matched {
            listener();
        }
    }

    fn register(&self, target: Option<NodeId>, event: &str, listener: Listener, once: bool) {
        self.listeners.borrow_mut().push(RegisteredListener {
            target,
            event: event.to_string(),
            listener,
            once,
        });
        tracing::trace!("Registered listener for '{}'", event);
    }

    fn with_node_mut(&self, node: NodeId, f: impl FnOnce(NodeMut<'_, Node>)) {
        match self.html.borrow_mut().tree.get_mut(node) {
            Some(node) => f(node),
            None => tracing::debug!("Ignoring unknown node {:?}", node),
        }
    }

    fn update_attributes(&self, node: NodeId, f: impl FnOnce(&mut Attributes)) {
        self.with_node_mut(node, |mut node| {
            if let Node::Element(element) = node.value() {
                let mut attributes: Attributes = element
                    .attrs
                    .iter()
                    .map(|(name, value)| (name.clone(), value.clone()))
                    .collect();
                f(&mut attributes);
                *element = new_element(element.name.clone(), attributes);
            }
        });
    }

    fn first_match(&self, scope: NodeId, selectors: &str) -> Option<NodeId> {
        let selector = parse_selector(selectors)?;
        let html = self.html.borrow();

        html.tree
            .get(scope)?
            .descendants()
            .skip(1)
            .filter_map(ElementRef::wrap)
            .find(|element| selector.matches(element))
            .map(|element| element.id())
    }
}

impl Dom for MemoryDocument {
    type Node = NodeId;

    fn query_selector(&self, selectors: &str) -> Option<NodeId> {
        let root = self.html.borrow().tree.root().id();
        self.first_match(root, selectors)
    }

    fn query_selector_in(&self, scope: &NodeId, selectors: &str) -> Option<NodeId> {
        self.first_match(*scope, selectors)
    }

    fn closest(&self, node: &NodeId, selectors: &str) -> Option<NodeId> {
        let selector = parse_selector(selectors)?;
        let html = self.html.borrow();
        let node = html.tree.get(*node)?;

        std::iter::once(node)
            .chain(node.ancestors())
            .filter_map(ElementRef::wrap)
            .find(|element| selector.matches(element))
            .map(|element| element.id())
    }

    fn create_element(&self, tag_name: &str) -> Option<NodeId> {
        if !is_valid_tag_name(tag_name) {
            tracing::warn!("Invalid tag name '{}'", tag_name);
            return None;
        }

        let name = QualName::new(
            None,
            ns!(html),
            LocalName::from(tag_name.to_ascii_lowercase().as_str()),
        );
        let element = Node::Element(new_element(name, Vec::new()));
        Some(self.html.borrow_mut().tree.orphan(element).id())
    }

    fn set_attribute(&self, node: &NodeId, name: &str, value: &str) {
        let name = QualName::new(
            None,
            ns!(),
            LocalName::from(name.to_ascii_lowercase().as_str()),
        );
        let value = StrTendril::from_slice(value);

        self.update_attributes(*node, move |attributes| {
            match attributes.iter_mut().find(|(key, _)| *key == name) {
                Some((_, existing)) => *existing = value,
                None => attributes.push((name, value)),
            }
        });
    }

    fn add_class(&self, node: &NodeId, class: &str) {
        if self.has_class(*node, class) {
            return;
        }
        let classes = match self.attribute(*node, "class") {
            Some(existing) if !existing.trim().is_empty() => format!("{} {}", existing.trim(), class),
            _ => class.to_string(),
        };
        self.set_attribute(node, "class", &classes);
    }

    fn remove_class(&self, node: &NodeId, class: &str) {
        if let Some(existing) = self.attribute(*node, "class") {
            let classes = existing
                .split_whitespace()
                .filter(|c| *c != class)
                .join(" ");
            self.set_attribute(node, "class", &classes);
        }
    }

    fn set_text_content(&self, node: &NodeId, text: &str) {
        self.with_node_mut(*node, |mut node| {
            clear_children(&mut node);
            if !text.is_empty() {
                node.append(Node::Text(Text {
                    text: StrTendril::from_slice(text),
                }));
            }
        });
    }

    fn set_inner_html(&self, node: &NodeId, html: &str) {
        let fragment = parser::parse_fragment(html);
        self.with_node_mut(*node, |mut node| {
            clear_children(&mut node);
            for child in fragment.root_element().children() {
                graft(&mut node, child);
            }
        });
    }

    fn text_content(&self, node: &NodeId) -> String {
        let html = self.html.borrow();

        html.tree
            .get(*node)
            .map(|node| {
                node.descendants()
                    .filter_map(|descendant| descendant.value().as_text())
                    .map(|text| &**text)
                    .collect::<String>()
            })
            .unwrap_or_default()
    }

    fn outer_html(&self, node: &NodeId) -> String {
        let html = self.html.borrow();

        html.tree
            .get(*node)
            .map(|node| to_markup(node, TraversalScope::IncludeNode))
            .unwrap_or_default()
    }

    fn insert_before(&self, reference: &NodeId, node: &NodeId) {
        let mut html = self.html.borrow_mut();
        let attached = html
            .tree
            .get(*reference)
            .is_some_and(|reference| reference.parent().is_some());
        if !attached || html.tree.get(*node).is_none() || contains(&html, *node, *reference) {
            tracing::debug!("Ignoring insert_before of {:?} at {:?}", node, reference);
            return;
        }

        if let Some(mut reference) = html.tree.get_mut(*reference) {
            reference.insert_id_before(*node);
        }
    }

    fn append_child(&self, parent: &NodeId, child: &NodeId) {
        let mut html = self.html.borrow_mut();
        if html.tree.get(*child).is_none() || contains(&html, *child, *parent) {
            tracing::debug!("Ignoring append_child of {:?} to {:?}", child, parent);
            return;
        }

        if let Some(mut parent) = html.tree.get_mut(*parent) {
            parent.append_id(*child);
        }
    }

    fn remove(&self, node: &NodeId) {
        self.with_node_mut(*node, |mut node| node.detach());
    }

    fn body(&self) -> Option<NodeId> {
        self.query_selector("body")
    }

    fn title(&self) -> String {
        self.query_selector("head title")
            .map(|title| {
                self.text_content(&title)
                    .split_whitespace()
                    .join(" ")
            })
            .unwrap_or_default()
    }

    fn ready_state(&self) -> ReadyState {
        self.ready_state.get()
    }

    fn computed_opacity(&self, node: &NodeId) -> f64 {
        let html = self.html.borrow();
        let Some(element) = html.tree.get(*node).and_then(ElementRef::wrap) else {
            return 1.0;
        };

        self.opacity_rules
            .borrow()
            .iter()
            .rev()
            .find(|(selector, _)| selector.matches(&element))
            .map(|(_, opacity)| *opacity)
            .unwrap_or(1.0)
    }

    fn force_layout(&self, _node: &NodeId) {
        self.layout_flushes.set(self.layout_flushes.get() + 1);
    }

    fn add_listener(&self, node: &NodeId, event: &str, listener: Listener) {
        self.register(Some(*node), event, listener, false);
    }

    fn add_document_listener(&self, event: &str, listener: Listener, once: bool) {
        self.register(None, event, listener, once);
    }
}

fn parse_selector(selectors: &str) -> Option<Selector> {
    Selector::parse(selectors)
        .inspect_err(|e| tracing::warn!("Invalid selector '{}': {}", selectors, e))
        .ok()
}

/// Tag names `document.createElement` accepts.
fn is_valid_tag_name(name: &str) -> bool {
    name.starts_with(|c: char| c.is_ascii_alphabetic())
        && !name.contains(|c: char| c.is_ascii_whitespace() || matches!(c, '\0' | '/' | '>'))
}

/// Goes through scraper's constructor so the cached id and class list match `attributes`.
fn new_element(name: QualName, attributes: Attributes) -> Element {
    Element::new(
        name,
        attributes
            .into_iter()
            .map(|(name, value)| Attribute { name, value })
            .collect(),
    )
}

/// Whether `node` is `ancestor` or one of its descendants.
fn contains(html: &Html, ancestor: NodeId, node: NodeId) -> bool {
    html.tree
        .get(node)
        .is_some_and(|node| node.id() == ancestor || node.ancestors().any(|a| a.id() == ancestor))
}

fn clear_children(node: &mut NodeMut<'_, Node>) {
    while let Some(mut child) = node.first_child() {
        child.detach();
    }
}

fn graft(parent: &mut NodeMut<'_, Node>, node: NodeRef<'_, Node>) {
    let mut copy = parent.append(node.value().clone());
    for child in node.children() {
        graft(&mut copy, child);
    }
}

fn to_markup(node: NodeRef<'_, Node>, traversal_scope: TraversalScope) -> String {
    let opts = SerializeOpts {
        scripting_enabled: false,
        traversal_scope,
        create_missing_parent: false,
    };
    let mut buf = Vec::new();
    if let Err(e) = html5ever::serialize::serialize(&mut buf, &Markup(node), opts) {
        tracing::warn!("Failed to serialize {:?}: {}", node.id(), e);
    }
    String::from_utf8_lossy(&buf).into_owned()
}

/// html5ever serialization of a subtree that parses back to the same text.
struct Markup<'a>(NodeRef<'a, Node>);

impl Serialize for Markup<'_> {
    fn serialize<S: Serializer>(
        &self,
        serializer: &mut S,
        traversal_scope: TraversalScope,
    ) -> io::Result<()> {
        let children_only = traversal_scope != TraversalScope::IncludeNode;

        for edge in self.0.traverse() {
            match edge {
                Edge::Open(node) | Edge::Close(node) if children_only && node == self.0 => {}
                Edge::Open(node) => match node.value() {
                    Node::Element(element) => serializer.start_elem(
                        element.name.clone(),
                        element.attrs.iter().map(|(name, value)| (name, &**value)),
                    )?,
                    Node::Text(text) => {
                        if drops_leading_newline(node) {
                            serializer.write_text("\n")?;
                        }
                        serializer.write_text(text)?;
                    }
                    Node::Comment(comment) => serializer.write_comment(comment)?,
                    Node::Doctype(doctype) => serializer.write_doctype(doctype.name())?,
                    _ => {}
                },
                Edge::Close(node) => {
                    if let Some(element) = node.value().as_element() {
                        serializer.end_elem(element.name.clone())?;
                    }
                }
            }
        }

        Ok(())
    }
}

/// A text node whose leading newline the parser would swallow after its parent's start tag.
fn drops_leading_newline(text: NodeRef<'_, Node>) -> bool {
    text.prev_sibling().is_none()
        && text
            .value()
            .as_text()
            .is_some_and(|text| text.starts_with('\n'))
        && text.parent().is_some_and(|parent| {
            parent
                .value()
                .as_element()
                .is_some_and(|element| LEADING_NEWLINE_ELEMENTS.contains(&element.name()))
        })
}
