use smol_str::SmolStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HeadingStyle {
    /// `# Heading`
    #[default]
    Atx,
    /// Underlined with `=` or `-` for levels 1 and 2, ATX below that.
    Setext,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CodeBlockStyle {
    #[default]
    Fenced,
    Indented,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    pub heading_style: HeadingStyle,
    pub code_block_style: CodeBlockStyle,
    pub bullet_list_marker: char,
    pub em_delimiter: SmolStr,
    pub strong_delimiter: SmolStr,
    pub horizontal_rule: SmolStr,
    /// Emitted before the newline of a hard line break.
    pub br: SmolStr,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        ConversionOptions {
            heading_style: HeadingStyle::Atx,
            code_block_style: CodeBlockStyle::Fenced,
            bullet_list_marker: '-',
            em_delimiter: SmolStr::new_static("*"),
            strong_delimiter: SmolStr::new_static("**"),
            horizontal_rule: SmolStr::new_static("---"),
            br: SmolStr::new_static("  "),
        }
    }
}
