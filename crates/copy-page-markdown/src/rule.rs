use super::code::{code_language, fence_for, normalize_newlines};
use super::node::HtmlElement;
use smol_str::SmolStr;

/// A custom conversion rule. Rules are consulted before the built-in element handlers
/// and the matched element is always rendered as a block.
pub trait Rule {
    fn matches(&self, element: &HtmlElement) -> bool;

    /// Markdown for the matched element. An empty string drops the element.
    fn replacement(&self, element: &HtmlElement) -> String;
}

/// Fenced code for styled code-block components that wrap a `<pre><code>` pair
/// together with line numbers, copy controls and language badges.
#[derive(Debug, Clone)]
pub struct RichCodeBlock {
    class: SmolStr,
}

impl RichCodeBlock {
    pub fn new(class: &str) -> Self {
        Self {
            class: SmolStr::new(class),
        }
    }
}

impl Rule for RichCodeBlock {
    fn matches(&self, element: &HtmlElement) -> bool {
        element.has_class(&self.class)
    }

    fn replacement(&self, element: &HtmlElement) -> String {
        let Some((pre, code)) = element.find_descendant(&|e| e.is("pre")).and_then(|pre| {
            pre.find_descendant(&|e| e.is("code"))
                .map(|code| (pre, code))
        }) else {
            return String::new();
        };

        // Expressive Code declares the language on the <pre> rather than the <code>.
        let language = code_language(code)
            .or_else(|| code_language(pre))
            .unwrap_or_default();
        let text = normalize_newlines(&code.text_content());
        let text = text.strip_suffix('\n').unwrap_or(&text);
        let fence = fence_for(text);

        format!("{fence}{language}\n{text}\n{fence}")
    }
}
