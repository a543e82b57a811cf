//! # copy-page: a "copy page as Markdown" button for documentation sites
//!
//! Mounts a button next to a docs page title that converts the rendered page body back to
//! Markdown and writes it to the clipboard, with an accessible success/error tooltip.
//!
//! The browser is reached only through three seams: [`Dom`], [`Scheduler`] and
//! [`ClipboardHost`]. The `copy-page-wasm` crate implements them over `web-sys`;
//! [`MemoryDocument`] implements [`Dom`] in memory for headless use and tests.
//!
//! ```rust
//! use copy_page::{ButtonOptions, page_markdown};
//!
//! let html = r#"<html><body><main>
//!   <h1 id="_top">Getting Started</h1>
//!   <div class="sl-markdown-content"><p>Hello <strong>world</strong></p></div>
//! </main></body></html>"#;
//!
//! assert_eq!(
//!     page_markdown(html, &ButtonOptions::default()).unwrap(),
//!     "# Getting Started\n\nHello **world**"
//! );
//! ```
pub mod clipboard;
pub mod dom;
mod error;
pub mod extract;
pub mod feedback;
pub mod mount;
pub mod options;
pub mod scheduler;
pub mod session;

pub use clipboard::{ClipboardHost, write_clipboard_text};
pub use dom::{Dom, Listener, MemoryDocument, NodeId, ReadyState};
pub use error::Error;
pub use extract::{ContentSnapshot, get_copy_value, page_title};
pub use feedback::{FeedbackPresenter, FeedbackTimings, Tooltip, TooltipPhase, TooltipTrigger};
pub use mount::{ButtonParts, CopyButton, Host, mount};
pub use options::{ButtonOptions, TitleLevel, UserOptions};
pub use scheduler::Scheduler;
pub use session::Session;

/// Returns the Markdown the copy button would put on the clipboard for a full HTML page.
pub fn page_markdown(html: &str, options: &ButtonOptions) -> Result<String, Error> {
    let dom = MemoryDocument::parse(html);
    let title = dom
        .query_selector(mount::TITLE_SELECTOR)
        .map(|title| dom.text_content(&title))
        .unwrap_or_default();

    extract::copy_value(&dom, options, &title)
}
