use copy_page_markdown::{Converter, RichCodeBlock, parser};
use itertools::Itertools;
use scraper::Html;

use crate::Error;
use crate::dom::Dom;
use crate::options::ButtonOptions;

pub const CONTENT_ROOT_SELECTOR: &str = "main .sl-markdown-content";
pub const RICH_CODE_BLOCK_CLASS: &str = "expressive-code";
/// Nodes that carry no page content: scripts, heading anchors, code-block copy buttons and
/// anything excluded from the search index.
pub const STRIP_SELECTORS: &[&str] = &[
    "script",
    "style",
    "noscript",
    ".sl-anchor-link",
    ".expressive-code .copy",
    "[data-pagefind-ignore]",
];

const UNTITLED: &str = "Untitled";

/// A detached copy of the content root. Mutating it never touches the live page.
#[derive(Debug)]
pub struct ContentSnapshot {
    html: Html,
}

impl ContentSnapshot {
    /// Clones the page's content root.
    pub fn capture<D: Dom>(dom: &D) -> Result<Self, Error> {
        let root = dom
            .query_selector(CONTENT_ROOT_SELECTOR)
            .ok_or(Error::ContentNotFound)?;

        Ok(Self::from_html(&dom.outer_html(&root)))
    }

    pub fn from_html(html: &str) -> Self {
        Self {
            html: parser::parse_fragment(html),
        }
    }

    /// Removes every node matched by [`STRIP_SELECTORS`].
    pub fn sanitize(mut self) -> Self {
        let removed = parser::strip(&mut self.html, STRIP_SELECTORS);
        tracing::trace!("Stripped {} nodes from content snapshot", removed);
        self
    }

    /// Trimmed Markdown for the snapshot.
    pub fn to_markdown(&self) -> String {
        markdown_converter()
            .convert(&parser::to_nodes(&self.html))
            .trim()
            .to_string()
    }
}

/// The converter used for page content: built-in rules plus fenced rich code blocks.
pub fn markdown_converter() -> Converter {
    Converter::default().with_rule(RichCodeBlock::new(RICH_CODE_BLOCK_CLASS))
}

/// Markdown for the current page, headed by `title` when the options ask for it.
pub fn get_copy_value<D: Dom>(
    dom: &D,
    options: &ButtonOptions,
    title: &D::Node,
) -> Result<String, Error> {
    copy_value(dom, options, &dom.text_content(title))
}

pub(crate) fn copy_value<D: Dom>(
    dom: &D,
    options: &ButtonOptions,
    title_text: &str,
) -> Result<String, Error> {
    let body = ContentSnapshot::capture(dom)?.sanitize().to_markdown();
    let heading = options.include_title.then(|| {
        format!(
            "{} {}",
            options.title_level.heading_prefix(),
            page_title(title_text, &dom.title())
        )
    });

    Ok(heading
        .into_iter()
        .chain(std::iter::once(body))
        .filter(|section| !section.is_empty())
        .join("\n\n")
        .trim()
        .to_string())
}

/// Collapses whitespace runs to single spaces and trims.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().join(" ")
}

/// The heading text, else the document title, else `"Untitled"`.
pub fn page_title(heading: &str, document_title: &str) -> String {
    [heading, document_title]
        .into_iter()
        .map(normalize_whitespace)
        .find(|title| !title.is_empty())
        .unwrap_or_else(|| UNTITLED.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;
    use crate::options::TitleLevel;
    use rstest::rstest;

    fn page(content: &str) -> MemoryDocument {
        MemoryDocument::parse(&format!(
            r#"<html><head><title>Docs Title</title></head><body><main>
<h1 id="_top">Getting Started</h1>
<div class="sl-markdown-content">{content}</div>
</main></body></html>"#
        ))
    }

    #[rstest]
    #[case("  My   Title\n", "", "My Title")]
    #[case("", "  Site\tTitle ", "Site Title")]
    #[case(" \n ", "", "Untitled")]
    #[case("", "", "Untitled")]
    fn test_page_title(#[case] heading: &str, #[case] document: &str, #[case] expected: &str) {
        assert_eq!(page_title(heading, document), expected);
    }

    #[test]
    fn test_copy_value_with_title() {
        let dom = page("<p>Hello <strong>world</strong></p>");
        let title = dom.query_selector("h1").unwrap();

        assert_eq!(
            get_copy_value(&dom, &ButtonOptions::default(), &title).unwrap(),
            "# Getting Started\n\nHello **world**"
        );
    }

    #[rstest]
    #[case(2, "## Getting Started\n\nBody")]
    #[case(6, "###### Getting Started\n\nBody")]
    fn test_copy_value_title_level(#[case] level: u8, #[case] expected: &str) {
        let dom = page("<p>Body</p>");
        let options = ButtonOptions {
            title_level: TitleLevel::new(level).unwrap(),
            ..Default::default()
        };

        assert_eq!(copy_value(&dom, &options, "Getting Started").unwrap(), expected);
    }

    #[test]
    fn test_copy_value_without_title() {
        let dom = page("<p>Body</p>");
        let options = ButtonOptions {
            include_title: false,
            ..Default::default()
        };

        assert_eq!(copy_value(&dom, &options, "Getting Started").unwrap(), "Body");
    }

    #[test]
    fn test_copy_value_falls_back_to_document_title() {
        let dom = page("<p>Body</p>");

        assert_eq!(
            copy_value(&dom, &ButtonOptions::default(), "   ").unwrap(),
            "# Docs Title\n\nBody"
        );
    }

    #[test]
    fn test_empty_content_yields_only_the_title() {
        let dom = page("<script>ignored()</script>");

        assert_eq!(
            copy_value(&dom, &ButtonOptions::default(), "Getting Started").unwrap(),
            "# Getting Started"
        );
    }

    #[test]
    fn test_missing_content_root() {
        let dom = MemoryDocument::parse("<html><body><main><h1 id=\"_top\">T</h1></main></body></html>");

        assert!(matches!(
            copy_value(&dom, &ButtonOptions::default(), "T"),
            Err(Error::ContentNotFound)
        ));
    }

    #[test]
    fn test_sanitize_strips_decorations() {
        let snapshot = ContentSnapshot::from_html(
            r##"<div class="sl-markdown-content">
<h2 id="setup">Setup<a class="sl-anchor-link" href="#setup">Section titled Setup</a></h2>
<style>.x{}</style>
<noscript>Enable JS</noscript>
<p data-pagefind-ignore>Hidden from search</p>
<div class="expressive-code"><figure><pre data-language="sh"><code>npm i</code></pre><div class="copy"><button>Copy</button></div></figure></div>
</div>"##,
        )
        .sanitize();

        assert_eq!(snapshot.to_markdown(), "## Setup\n\n```sh\nnpm i\n```");
    }

    #[test]
    fn test_capture_leaves_page_untouched() {
        let dom = page(r#"<p>Keep<script>x()</script></p>"#);
        let before = dom.html();

        let markdown = ContentSnapshot::capture(&dom).unwrap().sanitize().to_markdown();

        assert_eq!(markdown, "Keep");
        assert_eq!(dom.html(), before);
    }

    #[test]
    fn test_conversion_is_deterministic() {
        let dom = page("<ul><li>one</li><li>two <em>three</em></li></ul><pre><code>a```b</code></pre>");
        let title = dom.query_selector("h1").unwrap();
        let options = ButtonOptions::default();

        assert_eq!(
            get_copy_value(&dom, &options, &title).unwrap(),
            get_copy_value(&dom, &options, &title).unwrap()
        );
    }
}
