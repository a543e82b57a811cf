use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum Error {
    #[error("Markdown content root was not found")]
    #[diagnostic(
        code(copy_page::content_not_found),
        help("The page must contain an element matching `main .sl-markdown-content`.")
    )]
    ContentNotFound,

    #[error("Clipboard write was rejected: {0}")]
    #[diagnostic(code(copy_page::clipboard::rejected))]
    NativeClipboardRejected(String),

    #[error("Selection API unavailable")]
    #[diagnostic(code(copy_page::clipboard::selection_unsupported))]
    SelectionUnsupported,

    #[error("Copy command failed")]
    #[diagnostic(code(copy_page::clipboard::command_failed))]
    CopyCommandFailed,

    #[error("Document has no body to host the copy helper")]
    #[diagnostic(code(copy_page::clipboard::no_body))]
    BodyNotFound,

    #[error("Could not create a <{0}> element")]
    #[diagnostic(code(copy_page::dom::element_unavailable))]
    ElementUnavailable(&'static str),

    #[error("Invalid options: {0}")]
    #[diagnostic(
        code(copy_page::options::invalid),
        help("Options must be a JSON object such as `{{\"label\": \"Copy page\"}}`.")
    )]
    InvalidOptions(#[from] serde_json::Error),
}
