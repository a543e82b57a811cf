use async_trait::async_trait;
use copy_page::ClipboardHost;
use js_sys::{Function, Promise, Reflect};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::JsFuture;
use web_sys::{Document, Element, HtmlDocument, Window};

/// [`ClipboardHost`] over `navigator.clipboard`, the selection API and `execCommand`.
#[derive(Debug, Clone)]
pub struct BrowserClipboard {
    window: Window,
    document: Document,
}

impl BrowserClipboard {
    pub fn new(window: Window, document: Document) -> Self {
        Self { window, document }
    }

    /// `navigator.clipboard`, if the browser exposes one.
    fn clipboard(&self) -> Option<JsValue> {
        Reflect::get(self.window.navigator().as_ref(), &JsValue::from_str("clipboard"))
            .ok()
            .filter(JsValue::is_object)
    }

    fn write_text_function(&self) -> Option<(JsValue, Function)> {
        let clipboard = self.clipboard()?;
        let write_text = Reflect::get(&clipboard, &JsValue::from_str("writeText"))
            .ok()?
            .dyn_into::<Function>()
            .ok()?;
        Some((clipboard, write_text))
    }
}

fn describe(error: JsValue) -> String {
    error
        .as_string()
        .or_else(|| {
            error
                .dyn_ref::<js_sys::Error>()
                .map(|error| String::from(error.message()))
        })
        .unwrap_or_else(|| format!("{:?}", error))
}

#[async_trait(?Send)]
impl ClipboardHost for BrowserClipboard {
    type Node = Element;

    fn is_secure_context(&self) -> bool {
        self.window.is_secure_context()
    }

    fn has_async_clipboard(&self) -> bool {
        self.write_text_function().is_some()
    }

    async fn write_text(&self, text: &str) -> Result<(), String> {
        let (clipboard, write_text) = self
            .write_text_function()
            .ok_or_else(|| "navigator.clipboard.writeText is unavailable".to_string())?;
        let promise = write_text
            .call1(&clipboard, &JsValue::from_str(text))
            .map_err(describe)?
            .dyn_into::<Promise>()
            .map_err(describe)?;

        JsFuture::from(promise).await.map(|_| ()).map_err(describe)
    }

    fn select_node(&self, node: &Element) -> bool {
        let Ok(Some(selection)) = self.window.get_selection() else {
            return false;
        };
        let Ok(range) = self.document.create_range() else {
            return false;
        };

        range.select_node(node).is_ok()
            && selection.remove_all_ranges().is_ok()
            && selection.add_range(&range).is_ok()
    }

    fn clear_selection(&self) {
        if let Ok(Some(selection)) = self.window.get_selection() {
            let _ = selection.remove_all_ranges();
        }
    }

    fn exec_copy(&self) -> bool {
        self.document
            .unchecked_ref::<HtmlDocument>()
            .exec_command("copy")
            .unwrap_or(false)
    }
}
