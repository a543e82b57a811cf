//! # copy-page-markdown: rendered documentation HTML back to Markdown
//!
//! Converts the constrained HTML a documentation site renders for its page body
//! back into GitHub-flavored Markdown: ATX headings, fenced code blocks, `-` bullets,
//! `*`/`**` emphasis, tables and task lists.
//!
//! ```rust
//! use copy_page_markdown::{ConversionOptions, convert_html_to_markdown};
//!
//! let html = "<p>Hello <strong>world</strong>!</p>";
//! assert_eq!(
//!     convert_html_to_markdown(html, ConversionOptions::default()),
//!     "Hello **world**!"
//! );
//! ```
//!
//! Styled code-block components can be mapped back to plain fences with a [`Rule`]:
//!
//! ```rust
//! use copy_page_markdown::{Converter, RichCodeBlock};
//!
//! let converter = Converter::default().with_rule(RichCodeBlock::new("expressive-code"));
//! let html = r#"<div class="expressive-code"><pre data-language="sh"><code>npm i</code></pre></div>"#;
//! assert_eq!(converter.convert_html(html), "```sh\nnpm i\n```");
//! ```
mod code;
pub mod converter;
pub mod node;
pub mod options;
pub mod parser;
mod rule;

pub use code::{code_language, fence_for, normalize_newlines};
pub use converter::Converter;
pub use node::{HtmlElement, HtmlNode};
pub use options::{CodeBlockStyle, ConversionOptions, HeadingStyle};
pub use rule::{RichCodeBlock, Rule};

/// Converts an HTML fragment to Markdown with the built-in rules only.
pub fn convert_html_to_markdown(html_input: &str, options: ConversionOptions) -> String {
    if html_input.trim().is_empty() {
        return String::new();
    }

    Converter::new(options).convert_html(html_input)
}
