use super::node::{HtmlElement, HtmlNode};
use ego_tree::NodeRef;
use scraper::{Html, Node, Selector};

/// Parses an HTML fragment into a detached document.
pub fn parse_fragment(html: &str) -> Html {
    Html::parse_fragment(html)
}

/// Detaches every node matching any of `selectors` and returns how many were removed.
///
/// Selectors that fail to parse are skipped.
pub fn strip(html: &mut Html, selectors: &[&str]) -> usize {
    let mut ids = Vec::new();

    for selector in selectors {
        match Selector::parse(selector) {
            Ok(selector) => ids.extend(html.select(&selector).map(|element| element.id())),
            Err(e) => {
                tracing::warn!("Skipping invalid selector '{}': {:?}", selector, e);
            }
        }
    }

    for id in &ids {
        if let Some(mut node) = html.tree.get_mut(*id) {
            node.detach();
        }
    }

    ids.len()
}

/// Maps the top-level nodes of a parsed fragment to owned [`HtmlNode`]s.
pub fn to_nodes(html: &Html) -> Vec<HtmlNode> {
    html.root_element().children().filter_map(map_node).collect()
}

fn map_node(node: NodeRef<'_, Node>) -> Option<HtmlNode> {
    match node.value() {
        Node::Text(text) => Some(HtmlNode::Text((**text).to_owned())),
        Node::Element(element) => {
            let attributes = element
                .attrs()
                .map(|(name, value)| (name.to_string(), value.to_string()))
                .collect();
            let children = node.children().filter_map(map_node).collect();

            Some(HtmlNode::Element(HtmlElement::new(
                element.name(),
                attributes,
                children,
            )))
        }
        Node::Comment(comment) => Some(HtmlNode::Comment((**comment).to_owned())),
        _ => None,
    }
}
