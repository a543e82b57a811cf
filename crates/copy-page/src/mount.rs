use std::rc::Rc;

use crate::Error;
use crate::clipboard::{ClipboardHost, write_clipboard_text};
use crate::dom::Dom;
use crate::extract::get_copy_value;
use crate::feedback::FeedbackPresenter;
use crate::options::ButtonOptions;
use crate::scheduler::Scheduler;

/// The page's own top-level title, excluding titles rendered by custom page components.
pub const TITLE_SELECTOR: &str = "main h1#_top:not([data-page-title])";
pub const ROW_MARKER_ATTRIBUTE: &str = "data-sl-copy-button-row";
pub const ROW_MARKER_SELECTOR: &str = "[data-sl-copy-button-row]";

pub const COPY_ICON: &str = r#"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="1.75"><path d="M3 19a2 2 0 0 1-1-2V2a2 2 0 0 1 1-1h13a2 2 0 0 1 2 1"/><rect x="6" y="5" width="16" height="18" rx="1.5" ry="1.5"/></svg>"#;

/// Page capabilities shared by everything a mounted button does.
pub struct Host<D, S, C> {
    pub dom: Rc<D>,
    pub scheduler: Rc<S>,
    pub clipboard: Rc<C>,
}

impl<D, S, C> Host<D, S, C> {
    pub fn new(dom: Rc<D>, scheduler: Rc<S>, clipboard: Rc<C>) -> Self {
        Self {
            dom,
            scheduler,
            clipboard,
        }
    }
}

impl<D, S, C> Clone for Host<D, S, C> {
    fn clone(&self) -> Self {
        Self {
            dom: Rc::clone(&self.dom),
            scheduler: Rc::clone(&self.scheduler),
            clipboard: Rc::clone(&self.clipboard),
        }
    }
}

/// Handles to the nodes built around the page title.
#[derive(Debug, Clone, PartialEq)]
pub struct ButtonParts<N> {
    pub row: N,
    pub controls: N,
    pub live_region: N,
    pub button: N,
    pub title: N,
}

/// Wraps the page title in a button row. Returns `None` when there is no title to wrap or
/// it already sits in a row.
pub fn build_button_row<D: Dom>(dom: &D, options: &ButtonOptions) -> Option<ButtonParts<D::Node>> {
    let Some(title) = dom.query_selector(TITLE_SELECTOR) else {
        tracing::debug!("No page title found, skipping copy button");
        return None;
    };
    if dom.closest(&title, ROW_MARKER_SELECTOR).is_some() {
        tracing::debug!("Copy button already mounted");
        return None;
    }

    let row = element(dom, "div", "sl-copy-button-row")?;
    let controls = element(dom, "div", "sl-copy-button-controls")?;
    let live_region = element(dom, "div", "sl-copy-button-live-region")?;
    let button = element(dom, "button", "sl-copy-button")?;
    let background = element(dom, "div", "sl-copy-button__bg")?;
    let icon = element(dom, "span", "sl-copy-button__icon")?;
    let sr_label = element(dom, "span", "sl-copy-button__sr-only")?;
    let label = if options.icon_only {
        None
    } else {
        Some(element(dom, "span", "sl-copy-button__label")?)
    };

    dom.set_attribute(&row, ROW_MARKER_ATTRIBUTE, "true");
    dom.insert_before(&title, &row);
    dom.append_child(&row, &title);

    dom.set_attribute(&live_region, "aria-live", "polite");
    dom.set_attribute(&live_region, "aria-atomic", "true");

    dom.set_attribute(&button, "type", "button");
    dom.set_attribute(&button, "title", &options.label);
    dom.set_attribute(&button, "aria-label", &options.label);

    dom.set_attribute(&background, "aria-hidden", "true");

    dom.set_attribute(&icon, "aria-hidden", "true");
    dom.set_inner_html(&icon, COPY_ICON);

    dom.set_text_content(&sr_label, &options.label);

    for child in [&background, &icon, &sr_label] {
        dom.append_child(&button, child);
    }

    if let Some(label) = label {
        dom.set_text_content(&label, &options.label);
        dom.add_class(&controls, "sl-copy-button-controls--with-label");
        dom.append_child(&button, &label);
    }

    dom.append_child(&controls, &live_region);
    dom.append_child(&controls, &button);
    dom.append_child(&row, &controls);

    Some(ButtonParts {
        row,
        controls,
        live_region,
        button,
        title,
    })
}

fn element<D: Dom>(dom: &D, tag_name: &str, class: &str) -> Option<D::Node> {
    let Some(node) = dom.create_element(tag_name) else {
        tracing::warn!("Could not create <{}> for the copy button", tag_name);
        return None;
    };
    dom.add_class(&node, class);
    Some(node)
}

/// A mounted copy button.
pub struct CopyButton<D: Dom, S: Scheduler, C> {
    host: Host<D, S, C>,
    options: Rc<ButtonOptions>,
    parts: ButtonParts<D::Node>,
    feedback: FeedbackPresenter<D, S>,
}

impl<D, S, C> CopyButton<D, S, C>
where
    D: Dom + 'static,
    S: Scheduler + 'static,
    C: ClipboardHost<Node = D::Node> + 'static,
{
    pub fn parts(&self) -> &ButtonParts<D::Node> {
        &self.parts
    }

    pub fn options(&self) -> &ButtonOptions {
        &self.options
    }

    pub fn feedback(&self) -> &FeedbackPresenter<D, S> {
        &self.feedback
    }

    /// Converts the page and writes it to the clipboard, returning the copied text.
    pub async fn copy(&self) -> Result<String, Error> {
        let dom = &*self.host.dom;
        let text = get_copy_value(dom, &self.options, &self.parts.title)?;
        write_clipboard_text(dom, &*self.host.clipboard, &text).await?;
        Ok(text)
    }

    /// Copies and reports the outcome in the live region.
    pub async fn handle_click(&self) {
        match self.copy().await {
            Ok(text) => {
                tracing::info!("Copied {} bytes of page Markdown", text.len());
                self.feedback
                    .show(&self.options.success_label, self.options.state_duration, false);
            }
            Err(e) => {
                tracing::warn!("Failed to copy page: {}", e);
                self.feedback
                    .show(&self.options.error_label, self.options.error_duration(), true);
            }
        }
    }
}

/// Builds the button row and wires its click handler. Idempotent per document.
///
/// The click listener keeps the button alive for as long as the page holds the listener.
pub fn mount<D, S, C>(host: &Host<D, S, C>, options: Rc<ButtonOptions>) -> Option<Rc<CopyButton<D, S, C>>>
where
    D: Dom + 'static,
    S: Scheduler + 'static,
    C: ClipboardHost<Node = D::Node> + 'static,
{
    let parts = build_button_row(&*host.dom, &options)?;
    let feedback = FeedbackPresenter::new(
        Rc::clone(&host.dom),
        Rc::clone(&host.scheduler),
        parts.live_region.clone(),
    );
    let button = Rc::new(CopyButton {
        host: host.clone(),
        options,
        parts,
        feedback,
    });

    let handler = Rc::clone(&button);
    host.dom.add_listener(
        &button.parts.button,
        "click",
        Rc::new(move || {
            let button = Rc::clone(&handler);
            handler.host.scheduler.spawn_local(Box::pin(async move {
                button.handle_click().await;
            }));
        }),
    );

    tracing::info!("Mounted copy button");
    Some(button)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dom::MemoryDocument;

    const PAGE: &str = r#"<html><body><main>
<div class="content-panel"><h1 id="_top">Getting Started</h1></div>
<div class="sl-markdown-content"><p>Body</p></div>
</main></body></html>"#;

    #[test]
    fn test_build_button_row_structure() {
        let dom = MemoryDocument::parse(PAGE);
        let panel = dom.query_selector(".content-panel").unwrap();

        let parts = build_button_row(&dom, &ButtonOptions::default()).unwrap();

        assert_eq!(dom.parent(parts.row), Some(panel));
        assert_eq!(dom.parent(parts.title), Some(parts.row));
        assert_eq!(dom.parent(parts.controls), Some(parts.row));
        assert_eq!(dom.parent(parts.live_region), Some(parts.controls));
        assert_eq!(dom.parent(parts.button), Some(parts.controls));
        assert_eq!(dom.attribute(parts.row, ROW_MARKER_ATTRIBUTE).as_deref(), Some("true"));
        assert_eq!(dom.attribute(parts.live_region, "aria-live").as_deref(), Some("polite"));
        assert_eq!(dom.attribute(parts.live_region, "aria-atomic").as_deref(), Some("true"));
        assert_eq!(dom.attribute(parts.button, "type").as_deref(), Some("button"));
        assert_eq!(dom.attribute(parts.button, "aria-label").as_deref(), Some("Copy page"));
        assert!(dom.has_class(parts.controls, "sl-copy-button-controls--with-label"));
        assert!(dom.query_selector_in(&parts.button, ".sl-copy-button__icon svg").is_some());
        assert_eq!(
            dom.text_content(&parts.button),
            "Copy pageCopy page",
            "screen-reader label and visible label"
        );
    }

    #[test]
    fn test_build_button_row_icon_only() {
        let dom = MemoryDocument::parse(PAGE);
        let options = ButtonOptions {
            icon_only: true,
            ..Default::default()
        };

        let parts = build_button_row(&dom, &options).unwrap();

        assert!(dom.query_selector_in(&parts.button, ".sl-copy-button__label").is_none());
        assert!(!dom.has_class(parts.controls, "sl-copy-button-controls--with-label"));
        assert!(dom.query_selector_in(&parts.button, ".sl-copy-button__sr-only").is_some());
    }

    #[test]
    fn test_build_button_row_is_idempotent() {
        let dom = MemoryDocument::parse(PAGE);

        assert!(build_button_row(&dom, &ButtonOptions::default()).is_some());
        assert!(build_button_row(&dom, &ButtonOptions::default()).is_none());
        assert_eq!(dom.query_selector_all(ROW_MARKER_SELECTOR).len(), 1);
    }

    #[test]
    fn test_build_button_row_skips_custom_titles() {
        let dom = MemoryDocument::parse(
            r#"<html><body><main><h1 id="_top" data-page-title>Hero</h1></main></body></html>"#,
        );

        assert!(build_button_row(&dom, &ButtonOptions::default()).is_none());
        assert!(dom.query_selector(ROW_MARKER_SELECTOR).is_none());
    }
}
