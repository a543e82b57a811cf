use std::borrow::Cow;

use itertools::Itertools;

use super::code::{code_language, fence_for, normalize_newlines};
use super::node::{HtmlElement, HtmlNode};
use super::options::{CodeBlockStyle, ConversionOptions, HeadingStyle};
use super::parser;
use super::rule::Rule;

const BLOCK_TAGS: &[&str] = &[
    "address",
    "article",
    "aside",
    "audio",
    "blockquote",
    "body",
    "dd",
    "details",
    "dialog",
    "div",
    "dl",
    "dt",
    "embed",
    "fieldset",
    "figcaption",
    "figure",
    "footer",
    "form",
    "h1",
    "h2",
    "h3",
    "h4",
    "h5",
    "h6",
    "header",
    "hgroup",
    "hr",
    "html",
    "iframe",
    "li",
    "main",
    "menu",
    "nav",
    "object",
    "ol",
    "p",
    "pre",
    "section",
    "summary",
    "table",
    "tbody",
    "td",
    "tfoot",
    "th",
    "thead",
    "tr",
    "ul",
    "video",
];

const INLINE_TAGS: &[&str] = &[
    "a", "abbr", "b", "bdi", "bdo", "br", "button", "cite", "code", "data", "del", "dfn", "em",
    "i", "img", "input", "ins", "kbd", "label", "mark", "q", "s", "samp", "small", "span",
    "strike", "strong", "sub", "sup", "time", "u", "var", "wbr",
];

const SKIPPED_TAGS: &[&str] = &[
    "head", "link", "meta", "noscript", "script", "style", "svg", "template", "title",
];

struct MarkdownBlock {
    text: String,
    is_list: bool,
}

#[derive(Debug, Clone, Copy, PartialEq)]
enum Alignment {
    Left,
    Center,
    Right,
    Default,
}

/// HTML to Markdown converter with pluggable [`Rule`]s.
pub struct Converter {
    options: ConversionOptions,
    rules: Vec<Box<dyn Rule>>,
}

impl Default for Converter {
    fn default() -> Self {
        Self::new(ConversionOptions::default())
    }
}

impl Converter {
    pub fn new(options: ConversionOptions) -> Self {
        Self {
            options,
            rules: Vec::new(),
        }
    }

    /// Adds a rule. Rules are tried in insertion order before any built-in handler.
    pub fn with_rule(mut self, rule: impl Rule + 'static) -> Self {
        self.rules.push(Box::new(rule));
        self
    }

    pub fn options(&self) -> &ConversionOptions {
        &self.options
    }

    pub fn convert(&self, nodes: &[HtmlNode]) -> String {
        join_blocks(self.blocks(nodes)).trim().to_string()
    }

    pub fn convert_html(&self, html: &str) -> String {
        self.convert(&parser::to_nodes(&parser::parse_fragment(html)))
    }

    fn is_block(&self, element: &HtmlElement) -> bool {
        let tag_name = element.tag_name.as_str();
        if SKIPPED_TAGS.contains(&tag_name) {
            return false;
        }
        if BLOCK_TAGS.contains(&tag_name) || self.rules.iter().any(|rule| rule.matches(element)) {
            return true;
        }

        // Unknown and custom elements are blocks when they wrap block content.
        !INLINE_TAGS.contains(&tag_name)
            && element.element_children().any(|child| self.is_block(child))
    }

    fn blocks(&self, nodes: &[HtmlNode]) -> Vec<MarkdownBlock> {
        let mut blocks = Vec::new();
        let mut inline = InlineWriter::default();

        for node in nodes {
            match node {
                HtmlNode::Element(element) if self.is_block(element) => {
                    flush_inline(&mut inline, &mut blocks);
                    let text = self.block(element);
                    if !text.trim().is_empty() {
                        blocks.push(MarkdownBlock {
                            text,
                            is_list: element.is("ul") || element.is("ol"),
                        });
                    }
                }
                _ => self.inline(node, &mut inline),
            }
        }

        flush_inline(&mut inline, &mut blocks);
        blocks
    }

    fn block(&self, element: &HtmlElement) -> String {
        if let Some(rule) = self.rules.iter().find(|rule| rule.matches(element)) {
            return rule.replacement(element).trim_matches('\n').to_string();
        }

        match element.tag_name.as_str() {
            "h1" | "h2" | "h3" | "h4" | "h5" | "h6" => self.heading(element),
            "p" => self.inline_content(&element.children),
            "pre" => self.code_block(element),
            "ul" | "ol" => self.list(element),
            "blockquote" => self.blockquote(element),
            "hr" => self.options.horizontal_rule.to_string(),
            "table" => self.table(element),
            "dl" => self.definition_list(element),
            "iframe" | "video" | "audio" | "embed" | "object" => {
                embedded_content(element).unwrap_or_default()
            }
            _ => join_blocks(self.blocks(&element.children)),
        }
    }

    fn heading(&self, element: &HtmlElement) -> String {
        let content = self.inline_content(&element.children).replace('\n', " ");
        if content.is_empty() {
            return content;
        }

        let level = element.tag_name[1..].parse::<usize>().unwrap_or(1);
        match (self.options.heading_style, level) {
            (HeadingStyle::Setext, 1) => {
                format!("{}\n{}", content, "=".repeat(content.chars().count()))
            }
            (HeadingStyle::Setext, 2) => {
                format!("{}\n{}", content, "-".repeat(content.chars().count()))
            }
            _ => format!("{} {}", "#".repeat(level), content),
        }
    }

    fn code_block(&self, element: &HtmlElement) -> String {
        let code = element.element_children().find(|child| child.is("code"));
        let language = code
            .and_then(code_language)
            .or_else(|| code_language(element))
            .unwrap_or_default();
        let text = normalize_newlines(&preformatted_text(
            code.map_or(&element.children, |code| &code.children),
        ));
        let text = text.strip_suffix('\n').unwrap_or(&text);

        match self.options.code_block_style {
            CodeBlockStyle::Fenced => {
                let fence = fence_for(text);
                format!("{fence}{language}\n{text}\n{fence}")
            }
            CodeBlockStyle::Indented => text
                .lines()
                .map(|line| {
                    if line.is_empty() {
                        String::new()
                    } else {
                        format!("    {}", line)
                    }
                })
                .join("\n"),
        }
    }

    fn list(&self, element: &HtmlElement) -> String {
        let ordered = element.is("ol");
        let start = element
            .attr("start")
            .and_then(|start| start.trim().parse::<i64>().ok())
            .unwrap_or(1);

        element
            .element_children()
            .filter(|child| child.is("li"))
            .enumerate()
            .map(|(i, item)| {
                let marker = if ordered {
                    format!("{}. ", start.saturating_add_unsigned(i as u64))
                } else {
                    format!("{} ", self.options.bullet_list_marker)
                };
                indent_list_item(&marker, &self.list_item(item))
            })
            .join("\n")
    }

    fn list_item(&self, item: &HtmlElement) -> String {
        let mut content = String::new();

        for block in self.blocks(&item.children) {
            if !content.is_empty() {
                // Nested lists stay tight against their parent item.
                content.push_str(if block.is_list { "\n" } else { "\n\n" });
            }
            content.push_str(&block.text);
        }

        content
    }

    fn blockquote(&self, element: &HtmlElement) -> String {
        join_blocks(self.blocks(&element.children))
            .lines()
            .map(|line| {
                if line.is_empty() {
                    ">".to_string()
                } else {
                    format!("> {}", line)
                }
            })
            .join("\n")
    }

    fn table(&self, table: &HtmlElement) -> String {
        let mut rows = Vec::new();
        for child in table.element_children() {
            match child.tag_name.as_str() {
                "thead" | "tbody" | "tfoot" => {
                    rows.extend(child.element_children().filter(|row| row.is("tr")))
                }
                "tr" => rows.push(child),
                _ => {}
            }
        }

        let rows = rows
            .into_iter()
            .map(|row| {
                row.element_children()
                    .filter(|cell| cell.is("td") || cell.is("th"))
                    .map(|cell| {
                        let content = self
                            .inline_content(&cell.children)
                            .replace('\n', " ")
                            .replace('|', "\\|");
                        (content, cell_alignment(cell))
                    })
                    .collect::<Vec<_>>()
            })
            .filter(|cells| !cells.is_empty())
            .collect::<Vec<_>>();

        let Some((header, body)) = rows.split_first() else {
            return String::new();
        };
        let column_count = rows.iter().map(Vec::len).max().unwrap_or_default();

        let format_row = |cells: &[(String, Alignment)]| {
            format!(
                "| {} |",
                (0..column_count)
                    .map(|i| cells.get(i).map_or("", |(content, _)| content.as_str()))
                    .join(" | ")
            )
        };

        let separator = (0..column_count)
            .map(|i| match header.get(i).map_or(Alignment::Default, |(_, a)| *a) {
                Alignment::Left => ":---",
                Alignment::Center => ":---:",
                Alignment::Right => "---:",
                Alignment::Default => "---",
            })
            .join("|");

        std::iter::once(format_row(header.as_slice()))
            .chain(std::iter::once(format!("|{}|", separator)))
            .chain(body.iter().map(|cells| format_row(cells.as_slice())))
            .join("\n")
    }

    fn definition_list(&self, element: &HtmlElement) -> String {
        let mut parts = Vec::new();

        for child in &element.children {
            match child {
                HtmlNode::Element(term) if term.is("dt") => {
                    let text = self.inline_content(&term.children);
                    if !text.is_empty() {
                        parts.push(format!("{0}{1}{0}", self.options.strong_delimiter, text));
                    }
                }
                HtmlNode::Element(definition) if definition.is("dd") => {
                    let block = join_blocks(self.blocks(&definition.children));
                    if !block.is_empty() {
                        parts.push(
                            block
                                .lines()
                                .map(|line| {
                                    if line.is_empty() {
                                        String::new()
                                    } else {
                                        format!("  {}", line)
                                    }
                                })
                                .join("\n"),
                        );
                    }
                }
                HtmlNode::Element(_) => {
                    let block = join_blocks(self.blocks(std::slice::from_ref(child)));
                    if !block.is_empty() {
                        parts.push(block);
                    }
                }
                HtmlNode::Text(_) | HtmlNode::Comment(_) => {}
            }
        }

        parts.join("\n")
    }

    fn inline_content(&self, nodes: &[HtmlNode]) -> String {
        let mut writer = InlineWriter::default();
        self.inline_children(nodes, &mut writer);
        writer.finish()
    }

    fn inline_children(&self, nodes: &[HtmlNode], out: &mut InlineWriter) {
        nodes.iter().for_each(|node| self.inline(node, out));
    }

    fn inline(&self, node: &HtmlNode, out: &mut InlineWriter) {
        match node {
            HtmlNode::Text(text) => out.push_text(&collapse_whitespace(text)),
            HtmlNode::Element(element) => self.inline_element(element, out),
            HtmlNode::Comment(_) => {}
        }
    }

    fn inline_element(&self, element: &HtmlElement, out: &mut InlineWriter) {
        match element.tag_name.as_str() {
            tag if SKIPPED_TAGS.contains(&tag) => {}
            "br" => out.line_break(&self.options.br),
            "strong" | "b" => self.delimited(element, &self.options.strong_delimiter, out),
            "em" | "i" => self.delimited(element, &self.options.em_delimiter, out),
            "del" | "s" | "strike" => self.delimited(element, "~~", out),
            "code" | "samp" => {
                let code = collapse_whitespace(&element.text_content());
                if !code.is_empty() {
                    out.push_markup(&inline_code(&code));
                }
            }
            "kbd" => {
                let content = self.nested_inline(&element.children);
                out.push_markup(&format!("<kbd>{}</kbd>", content.trim()));
            }
            "a" => self.link(element, out),
            "img" => {
                if let Some(image) = image(element) {
                    out.push_markup(&image);
                }
            }
            "input" => {
                if element
                    .attr("type")
                    .is_some_and(|t| t.eq_ignore_ascii_case("checkbox"))
                {
                    out.push_markup(if element.has_attr("checked") {
                        "[x] "
                    } else {
                        "[ ] "
                    });
                }
            }
            tag if BLOCK_TAGS.contains(&tag) => {
                out.push_space();
                self.inline_children(&element.children, out);
                out.push_space();
            }
            _ => self.inline_children(&element.children, out),
        }
    }

    fn nested_inline(&self, nodes: &[HtmlNode]) -> String {
        let mut writer = InlineWriter::nested();
        self.inline_children(nodes, &mut writer);
        writer.buf
    }

    fn delimited(&self, element: &HtmlElement, delimiter: &str, out: &mut InlineWriter) {
        let content = self.nested_inline(&element.children);
        let trimmed = content.trim();

        if trimmed.is_empty() {
            if !content.is_empty() {
                out.push_space();
            }
            return;
        }

        out.push_flanked(&content, &format!("{delimiter}{trimmed}{delimiter}"));
    }

    fn link(&self, element: &HtmlElement, out: &mut InlineWriter) {
        let content = self.nested_inline(&element.children);
        let text = content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .join(" ");

        let Some(href) = element.attr("href").filter(|href| !href.is_empty()) else {
            if !text.is_empty() {
                out.push_flanked(&content, &text);
            }
            return;
        };

        let link = format!(
            "[{}]({}{})",
            text,
            process_url_for_markdown(href),
            title_part(element)
        );
        out.push_flanked(&content, &link);
    }
}

/// Accumulates inline Markdown for one block, collapsing whitespace across node boundaries.
#[derive(Debug, Default)]
struct InlineWriter {
    buf: String,
    nested: bool,
}

impl InlineWriter {
    fn nested() -> Self {
        Self {
            buf: String::new(),
            nested: true,
        }
    }

    fn at_line_start(&self) -> bool {
        if self.buf.is_empty() {
            !self.nested
        } else {
            self.buf.ends_with('\n')
        }
    }

    fn trim_leading<'a>(&self, text: &'a str) -> &'a str {
        if (self.buf.is_empty() && !self.nested) || self.buf.ends_with([' ', '\n']) {
            text.trim_start_matches(' ')
        } else {
            text
        }
    }

    fn push_text(&mut self, text: &str) {
        let text = self.trim_leading(text);
        if text.is_empty() {
            return;
        }

        let escaped = escape_text(text);
        if self.at_line_start() {
            self.buf.push_str(&escape_line_start(&escaped));
        } else {
            self.buf.push_str(&escaped);
        }
    }

    fn push_space(&mut self) {
        let space = self.trim_leading(" ");
        self.buf.push_str(space);
    }

    fn push_markup(&mut self, markup: &str) {
        self.buf.push_str(markup);
    }

    /// Pushes `markup`, keeping the leading and trailing whitespace of `content` outside it.
    fn push_flanked(&mut self, content: &str, markup: &str) {
        if content.starts_with(char::is_whitespace) {
            self.push_space();
        }
        self.push_markup(markup);
        if content.ends_with(char::is_whitespace) {
            self.push_space();
        }
    }

    fn line_break(&mut self, br: &str) {
        let kept = self.buf.trim_end_matches(' ').len();
        self.buf.truncate(kept);
        self.buf.push_str(br);
        self.buf.push('\n');
    }

    fn finish(self) -> String {
        self.buf.trim().to_string()
    }
}

fn flush_inline(inline: &mut InlineWriter, blocks: &mut Vec<MarkdownBlock>) {
    let text = std::mem::take(inline).finish();
    if !text.is_empty() {
        blocks.push(MarkdownBlock {
            text,
            is_list: false,
        });
    }
}

fn join_blocks(blocks: Vec<MarkdownBlock>) -> String {
    blocks.into_iter().map(|block| block.text).join("\n\n")
}

fn indent_list_item(marker: &str, content: &str) -> String {
    if content.is_empty() {
        return marker.trim_end().to_string();
    }

    let indent = " ".repeat(marker.len());
    content
        .lines()
        .enumerate()
        .map(|(i, line)| {
            if i == 0 {
                format!("{}{}", marker, line)
            } else if line.is_empty() {
                String::new()
            } else {
                format!("{}{}", indent, line)
            }
        })
        .join("\n")
}

fn preformatted_text(nodes: &[HtmlNode]) -> String {
    let mut text = String::new();
    for node in nodes {
        match node {
            HtmlNode::Text(value) => text.push_str(value),
            HtmlNode::Element(el) if el.is("br") => text.push('\n'),
            HtmlNode::Element(el) => text.push_str(&preformatted_text(&el.children)),
            HtmlNode::Comment(_) => {}
        }
    }
    text
}

fn collapse_whitespace(text: &str) -> String {
    let mut collapsed = String::with_capacity(text.len());
    let mut pending_space = false;

    for c in text.chars() {
        if c.is_ascii_whitespace() {
            pending_space = true;
        } else {
            if pending_space {
                collapsed.push(' ');
                pending_space = false;
            }
            collapsed.push(c);
        }
    }
    if pending_space {
        collapsed.push(' ');
    }

    collapsed
}

fn escape_text(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        if matches!(c, '\\' | '*' | '_' | '`' | '[' | ']') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

fn escape_line_start(text: &str) -> Cow<'_, str> {
    let hashes = text.chars().take_while(|c| *c == '#').count();
    let digits = text.chars().take_while(char::is_ascii_digit).count();

    if ((1..=6).contains(&hashes) && text[hashes..].starts_with(' '))
        || text.starts_with(['>', '-', '='])
        || text.starts_with("+ ")
        || text.starts_with("~~~")
    {
        Cow::Owned(format!("\\{}", text))
    } else if digits > 0 && text[digits..].starts_with(". ") {
        Cow::Owned(format!("{}\\{}", &text[..digits], &text[digits..]))
    } else {
        Cow::Borrowed(text)
    }
}

fn inline_code(code: &str) -> String {
    let runs = code
        .split(|c| c != '`')
        .map(str::len)
        .filter(|len| *len > 0)
        .collect::<Vec<_>>();
    let delimiter = "`".repeat((1..).find(|n| !runs.contains(n)).unwrap_or(1));
    let padding = if code.starts_with('`') || code.ends_with('`') {
        " "
    } else {
        ""
    };

    format!("{delimiter}{padding}{code}{padding}{delimiter}")
}

fn image(element: &HtmlElement) -> Option<String> {
    let src = element.attr("src").filter(|src| !src.is_empty())?;
    let alt = element.attr("alt").unwrap_or_default().replace('\n', " ");

    Some(format!(
        "![{}]({}{})",
        alt,
        process_url_for_markdown(src),
        title_part(element)
    ))
}

fn title_part(element: &HtmlElement) -> String {
    element
        .attr("title")
        .filter(|title| !title.is_empty())
        .map(|title| format!(" \"{}\"", title.replace('"', "\\\"")))
        .unwrap_or_default()
}

fn process_url_for_markdown(url: &str) -> String {
    let processed_url = url.replace(' ', "%20");
    if processed_url.contains(['(', ')']) || url.contains(' ') {
        format!("<{}>", processed_url)
    } else {
        processed_url
    }
}

fn cell_alignment(element: &HtmlElement) -> Alignment {
    let from_style = element.attr("style").and_then(|style| {
        style.split(';').find_map(|declaration| {
            let (property, value) = declaration.split_once(':')?;
            (property.trim() == "text-align").then(|| value.trim().to_lowercase())
        })
    });

    match from_style
        .or_else(|| element.attr("align").map(str::to_lowercase))
        .as_deref()
    {
        Some("left") => Alignment::Left,
        Some("center") => Alignment::Center,
        Some("right") => Alignment::Right,
        _ => Alignment::Default,
    }
}

fn embedded_content(element: &HtmlElement) -> Option<String> {
    let tag_name = element.tag_name.as_str();
    let src = match tag_name {
        "object" => element.attr("data"),
        "video" | "audio" => element.attr("src").or_else(|| {
            element
                .element_children()
                .filter(|child| child.is("source"))
                .find_map(|source| source.attr("src"))
        }),
        _ => element.attr("src"),
    }
    .filter(|src| !src.is_empty())?;

    let description = element
        .attr("title")
        .filter(|title| !title.is_empty())
        .unwrap_or(match tag_name {
            "iframe" => "Embedded Iframe",
            "video" => "Video",
            "audio" => "Audio",
            "embed" => "Embedded Content",
            "object" => "Embedded Object",
            _ => "Embedded Resource",
        });
    let poster = element
        .attr("poster")
        .filter(|poster| tag_name == "video" && !poster.is_empty())
        .map(|poster| format!(" (Poster: {})", poster))
        .unwrap_or_default();

    Some(format!(
        "[{}]({}{}){}",
        description,
        src,
        title_part(element),
        poster
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::options::{CodeBlockStyle, HeadingStyle};
    use rstest::rstest;

    fn convert(html: &str) -> String {
        Converter::default().convert_html(html)
    }

    #[rstest]
    #[case("<p>Hello, world!</p>", "Hello, world!")]
    #[case("<h2>Title</h2>", "## Title")]
    #[case("<p><strong>Bold</strong> and <em>Italic</em></p>", "**Bold** and *Italic*")]
    #[case("<p><b>Bold</b> and <i>Italic</i></p>", "**Bold** and *Italic*")]
    #[case(
        "<p><a href=\"https://example.com\">link</a></p>",
        "[link](https://example.com)"
    )]
    #[case("<ul><li>Item 1</li><li>Item 2</li></ul>", "- Item 1\n- Item 2")]
    #[case("<ol><li>First</li><li>Second</li></ol>", "1. First\n2. Second")]
    #[case("<ol start=\"3\"><li>a</li><li>b</li></ol>", "3. a\n4. b")]
    #[case("<ol start=\"-1\"><li>a</li><li>b</li></ol>", "-1. a\n0. b")]
    #[case(
        "<ol start=\"9223372036854775807\"><li>a</li><li>b</li></ol>",
        "9223372036854775807. a\n9223372036854775807. b"
    )]
    #[case("<ol start=\"18446744073709551615\"><li>a</li><li>b</li></ol>", "1. a\n2. b")]
    #[case("<pre><code>let x = 1;</code></pre>", "```\nlet x = 1;\n```")]
    #[case(
        "<pre><code class=\"language-rust\">fn main() {}\n</code></pre>",
        "```rust\nfn main() {}\n```"
    )]
    #[case(
        "<table><thead><tr><th>Header</th></tr></thead><tbody><tr><td>Cell</td></tr></tbody></table>",
        "| Header |\n|---|\n| Cell |"
    )]
    #[case("<blockquote><p>Quote</p></blockquote>", "> Quote")]
    #[case(
        "<blockquote><p>One</p><p>Two</p></blockquote>",
        "> One\n>\n> Two"
    )]
    #[case("<p><img src=\"img.png\" alt=\"alt text\"></p>", "![alt text](img.png)")]
    #[case("<hr>", "---")]
    #[case("<p>a<br>b</p>", "a  \nb")]
    #[case("<p><del>gone</del></p>", "~~gone~~")]
    fn test_convert_html_param(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(convert(html), expected);
    }

    #[test]
    fn test_whitespace_is_collapsed_around_emphasis() {
        assert_eq!(
            convert("<p>  Hello\n   <em> big </em>  world </p>"),
            "Hello *big* world"
        );
    }

    #[test]
    fn test_text_is_escaped() {
        assert_eq!(
            convert("<p>2. not a list * star_under [x]</p>"),
            "2\\. not a list \\* star\\_under \\[x\\]"
        );
        assert_eq!(convert("<p># not a heading</p>"), "\\# not a heading");
        assert_eq!(convert("<p>- dash</p><p>a - b</p>"), "\\- dash\n\na - b");
    }

    #[test]
    fn test_nested_list_is_indented_by_marker_width() {
        assert_eq!(
            convert("<ul><li>One<ul><li>Sub</li></ul></li><li>Two</li></ul>"),
            "- One\n  - Sub\n- Two"
        );
        assert_eq!(
            convert("<ol><li><p>Para</p><p>More</p></li></ol>"),
            "1. Para\n\n   More"
        );
    }

    #[test]
    fn test_task_list_items() {
        assert_eq!(
            convert(concat!(
                "<ul><li><input type=\"checkbox\" checked disabled> Done</li>",
                "<li><input type=\"checkbox\" disabled> Todo</li></ul>"
            )),
            "- [x] Done\n- [ ] Todo"
        );
    }

    #[rstest]
    #[case("<p><code>plain</code></p>", "`plain`")]
    #[case("<p><code>a`b</code></p>", "``a`b``")]
    #[case("<p><code>`tick`</code></p>", "`` `tick` ``")]
    fn test_inline_code(#[case] html: &str, #[case] expected: &str) {
        assert_eq!(convert(html), expected);
    }

    #[test]
    fn test_code_block_fence_grows_with_content() {
        assert_eq!(
            convert("<pre><code>```\ninner\n```</code></pre>"),
            "````\n```\ninner\n```\n````"
        );
    }

    #[test]
    fn test_link_title_and_spaces() {
        assert_eq!(
            convert(r#"<p><a href="/a b" title='say "hi"'>x</a></p>"#),
            r#"[x](</a%20b> "say \"hi\"")"#
        );
        assert_eq!(convert("<p><a>no href</a></p>"), "no href");
    }

    #[test]
    fn test_mixed_inline_and_block_content() {
        assert_eq!(
            convert("<div>intro <p>para</p> tail</div>"),
            "intro\n\npara\n\ntail"
        );
    }

    #[test]
    fn test_custom_elements_wrapping_blocks_are_blocks() {
        assert_eq!(
            convert("<starlight-tabs><p>One</p><p>Two</p></starlight-tabs>"),
            "One\n\nTwo"
        );
    }

    #[test]
    fn test_skipped_elements_emit_nothing() {
        assert_eq!(
            convert(concat!(
                "<p>Text<svg><title>icon</title></svg></p>",
                "<script>alert(1)</script><style>p{}</style><!-- comment -->"
            )),
            "Text"
        );
    }

    #[test]
    fn test_table_alignment_and_padding() {
        let html = concat!(
            "<table><thead>",
            "<tr><th style=\"text-align:left\">Left</th>",
            "<th style=\"text-align: center\">Center</th>",
            "<th align=\"right\">Right</th></tr>",
            "</thead><tbody><tr><td>1</td><td>a|b</td></tr></tbody></table>"
        );
        assert_eq!(
            convert(html),
            "| Left | Center | Right |\n|:---|:---:|---:|\n| 1 | a\\|b |  |"
        );
    }

    #[test]
    fn test_definition_list() {
        assert_eq!(
            convert("<dl><dt>Term</dt><dd>Meaning</dd></dl>"),
            "**Term**\n  Meaning"
        );
    }

    #[test]
    fn test_embedded_video_with_poster() {
        assert_eq!(
            convert("<video poster=\"p.png\"><source src=\"v.mp4\"></video>"),
            "[Video](v.mp4) (Poster: p.png)"
        );
    }

    #[test]
    fn test_setext_and_indented_options() {
        let converter = Converter::new(ConversionOptions {
            heading_style: HeadingStyle::Setext,
            code_block_style: CodeBlockStyle::Indented,
            ..Default::default()
        });

        assert_eq!(
            converter.convert_html("<h1>Title</h1><h2>Sub</h2><h3>Deep</h3>"),
            "Title\n=====\n\nSub\n---\n\n### Deep"
        );
        assert_eq!(
            converter.convert_html("<pre><code>a\n\nb</code></pre>"),
            "    a\n\n    b"
        );
    }

    struct Shout;

    impl Rule for Shout {
        fn matches(&self, element: &HtmlElement) -> bool {
            element.has_class("shout")
        }

        fn replacement(&self, element: &HtmlElement) -> String {
            format!("\n\n{}\n\n", element.text_content().to_uppercase())
        }
    }

    #[test]
    fn test_rules_take_precedence_over_builtins() {
        let converter = Converter::default().with_rule(Shout);
        assert_eq!(
            converter.convert_html("<p>before</p><p class=\"shout\">loud</p><p>after</p>"),
            "before\n\nLOUD\n\nafter"
        );
    }
}
