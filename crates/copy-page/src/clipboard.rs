use async_trait::async_trait;

use crate::Error;
use crate::dom::Dom;

/// Inline style for the fallback helper: present for selection, invisible and inert.
pub const HELPER_STYLE: &str = "opacity:0;pointer-events:none;position:absolute;overflow:hidden;left:0;top:0;width:20px;height:20px;-webkit-user-select:auto;user-select:all";

/// Clipboard and selection capabilities of the page.
#[async_trait(?Send)]
pub trait ClipboardHost {
    type Node;

    fn is_secure_context(&self) -> bool;
    fn has_async_clipboard(&self) -> bool;
    /// Native asynchronous write. `Err` carries the rejection reason.
    async fn write_text(&self, text: &str) -> Result<(), String>;

    /// Selects the full contents of `node`. Returns `false` when selection is unavailable.
    fn select_node(&self, node: &Self::Node) -> bool;
    fn clear_selection(&self);
    /// The legacy synchronous copy command. Returns whether it reported success.
    fn exec_copy(&self) -> bool;
}

/// Writes `text` to the clipboard, falling back to a selected helper element and the copy
/// command when the native API is missing or the context is not secure.
pub async fn write_clipboard_text<D, C>(dom: &D, clipboard: &C, text: &str) -> Result<(), Error>
where
    D: Dom,
    C: ClipboardHost<Node = D::Node> + ?Sized,
{
    if clipboard.has_async_clipboard() && clipboard.is_secure_context() {
        tracing::debug!("Writing {} bytes with the async clipboard", text.len());
        return clipboard
            .write_text(text)
            .await
            .map_err(Error::NativeClipboardRejected);
    }

    tracing::debug!("Async clipboard unavailable, using the copy command");
    let body = dom.body().ok_or(Error::BodyNotFound)?;
    let helper = dom
        .create_element("pre")
        .ok_or(Error::ElementUnavailable("pre"))?;
    dom.set_attribute(&helper, "style", HELPER_STYLE);
    dom.set_attribute(&helper, "aria-hidden", "true");
    dom.set_text_content(&helper, text);
    dom.append_child(&body, &helper);

    if !clipboard.select_node(&helper) {
        dom.remove(&helper);
        return Err(Error::SelectionUnsupported);
    }

    let copied = clipboard.exec_copy();
    clipboard.clear_selection();
    dom.remove(&helper);

    if copied {
        Ok(())
    } else {
        Err(Error::CopyCommandFailed)
    }
}
