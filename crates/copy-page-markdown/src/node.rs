use rustc_hash::FxHashMap;
use smol_str::SmolStr;

#[derive(Debug, Clone, PartialEq)]
pub enum HtmlNode {
    Text(String),
    Element(HtmlElement),
    Comment(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct HtmlElement {
    pub tag_name: SmolStr,
    pub attributes: FxHashMap<String, String>,
    pub children: Vec<HtmlNode>,
}

impl HtmlNode {
    pub fn as_element(&self) -> Option<&HtmlElement> {
        match self {
            HtmlNode::Element(element) => Some(element),
            _ => None,
        }
    }

    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.collect_text(&mut text);
        text
    }

    fn collect_text(&self, text: &mut String) {
        match self {
            HtmlNode::Text(value) => text.push_str(value),
            HtmlNode::Element(element) => element
                .children
                .iter()
                .for_each(|child| child.collect_text(text)),
            HtmlNode::Comment(_) => {}
        }
    }
}

impl HtmlElement {
    pub fn new(
        tag_name: &str,
        attributes: FxHashMap<String, String>,
        children: Vec<HtmlNode>,
    ) -> Self {
        HtmlElement {
            tag_name: SmolStr::new(tag_name.to_lowercase()),
            attributes,
            children,
        }
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attributes.get(name).map(String::as_str)
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attributes.contains_key(name)
    }

    pub fn classes(&self) -> impl Iterator<Item = &str> {
        self.attr("class").unwrap_or_default().split_whitespace()
    }

    pub fn has_class(&self, class: &str) -> bool {
        self.classes().any(|c| c == class)
    }

    pub fn is(&self, tag_name: &str) -> bool {
        self.tag_name == tag_name
    }

    pub fn element_children(&self) -> impl Iterator<Item = &HtmlElement> {
        self.children.iter().filter_map(HtmlNode::as_element)
    }

    /// Concatenated text of all descendant text nodes, like the DOM `textContent`.
    pub fn text_content(&self) -> String {
        let mut text = String::new();
        self.children
            .iter()
            .for_each(|child| child.collect_text(&mut text));
        text
    }

    /// Depth-first search over descendants, excluding `self`.
    pub fn find_descendant<F>(&self, predicate: &F) -> Option<&HtmlElement>
    where
        F: Fn(&HtmlElement) -> bool,
    {
        self.element_children().find_map(|child| {
            if predicate(child) {
                Some(child)
            } else {
                child.find_descendant(predicate)
            }
        })
    }
}
