//! WebAssembly bindings for the copy-page button.
//!
//! Exposes `setupCopyButton(options)`, called by the page script on every load, and
//! `pageMarkdown(html, options)` for converting a rendered page without a browser DOM.
pub mod clipboard;
pub mod dom;
pub mod log;
pub mod scheduler;

use std::cell::RefCell;
use std::rc::Rc;

use copy_page::{ButtonOptions, Host, Session, UserOptions};
use wasm_bindgen::prelude::*;

pub use clipboard::BrowserClipboard;
pub use dom::BrowserDom;
pub use scheduler::BrowserScheduler;

pub type BrowserSession = Session<BrowserDom, BrowserScheduler, BrowserClipboard>;

#[wasm_bindgen(typescript_custom_section)]
const TS_CUSTOM_SECTION: &'static str = r#"
export interface CopyButtonOptions {
  includeTitle?: boolean;
  titleLevel?: 1 | 2 | 3 | 4 | 5 | 6;
  label?: string;
  successLabel?: string;
  errorLabel?: string;
  stateDuration?: number;
  iconOnly?: boolean;
}

export function setupCopyButton(options?: CopyButtonOptions): void;
export function pageMarkdown(html: string, options?: CopyButtonOptions): string;
"#;

thread_local! {
    static SESSION: RefCell<Option<Rc<BrowserSession>>> = const { RefCell::new(None) };
}

fn button_options(options: JsValue) -> Result<ButtonOptions, JsValue> {
    if options.is_undefined() || options.is_null() {
        return Ok(ButtonOptions::default());
    }

    let options: UserOptions = serde_wasm_bindgen::from_value(options)?;
    Ok(options.normalize())
}

fn session() -> Result<Rc<BrowserSession>, JsValue> {
    SESSION.with(|session| {
        if let Some(session) = session.borrow().as_ref() {
            return Ok(Rc::clone(session));
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no global window"))?;
        let dom = BrowserDom::new(window.clone())?;
        let clipboard = BrowserClipboard::new(window.clone(), dom.document().clone());
        let host = Host::new(
            Rc::new(dom),
            Rc::new(BrowserScheduler::new(window)),
            Rc::new(clipboard),
        );
        let created = Rc::new(Session::new(host));
        *session.borrow_mut() = Some(Rc::clone(&created));
        Ok(created)
    })
}

/// Mounts the copy button on the current page and on every later client-side navigation.
#[wasm_bindgen(js_name=setupCopyButton, skip_typescript)]
pub fn setup_copy_button(options: JsValue) -> Result<(), JsValue> {
    log::init(tracing::Level::INFO);

    let options = button_options(options)?;
    session()?.setup(options);
    Ok(())
}

/// The Markdown the button would copy for a full HTML page.
#[wasm_bindgen(js_name=pageMarkdown, skip_typescript)]
pub fn page_markdown(html: &str, options: JsValue) -> Result<String, JsValue> {
    let options = button_options(options)?;
    copy_page::page_markdown(html, &options).map_err(|e| JsValue::from_str(&e.to_string()))
}
