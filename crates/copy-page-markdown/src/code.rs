use super::node::HtmlElement;

/// Returns a backtick fence longer than any backtick run in `code`, at least three long.
pub fn fence_for(code: &str) -> String {
    let longest_run = code
        .split(|c| c != '`')
        .map(str::len)
        .max()
        .unwrap_or_default();
    "`".repeat((longest_run + 1).max(3))
}

/// Declared language of a code element: `data-language`, then a `language-xxx` class token.
pub fn code_language(element: &HtmlElement) -> Option<String> {
    if let Some(language) = element.attr("data-language").filter(|l| !l.is_empty()) {
        return Some(language.to_string());
    }

    element.classes().find_map(|class| {
        let language: String = class
            .strip_prefix("language-")?
            .chars()
            .take_while(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
            .collect();
        (!language.is_empty()).then_some(language)
    })
}

/// Converts `\r\n` and lone `\r` line endings to `\n`.
pub fn normalize_newlines(text: &str) -> String {
    text.replace("\r\n", "\n").replace('\r', "\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use rustc_hash::FxHashMap;

    #[rstest]
    #[case("let x = 1;", "```")]
    #[case("a `b` c", "```")]
    #[case("```ts\nnested\n```", "````")]
    #[case("``````", "```````")]
    fn test_fence_for(#[case] code: &str, #[case] expected: &str) {
        assert_eq!(fence_for(code), expected);
    }

    #[rstest]
    #[case(&[("data-language", "ts"), ("class", "language-js")], Some("ts"))]
    #[case(&[("data-language", ""), ("class", "hl language-js")], Some("js"))]
    #[case(&[("class", "language-shell-session x")], Some("shell-session"))]
    #[case(&[("class", "language-")], None)]
    #[case(&[("class", "language-日本")], None)]
    #[case(&[("class", "language-cé")], Some("c"))]
    #[case(&[], None)]
    fn test_code_language(#[case] attrs: &[(&str, &str)], #[case] expected: Option<&str>) {
        let attributes: FxHashMap<String, String> = attrs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        let code = HtmlElement::new("code", attributes, vec![]);
        assert_eq!(code_language(&code).as_deref(), expected);
    }

    #[test]
    fn test_normalize_newlines() {
        assert_eq!(normalize_newlines("a\r\nb\rc\n"), "a\nb\nc\n");
    }
}
