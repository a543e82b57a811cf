use copy_page::dom::LEADING_NEWLINE_ELEMENTS;
use copy_page::{Dom, Listener, ReadyState};
use wasm_bindgen::prelude::*;
use web_sys::{AddEventListenerOptions, Document, Element, HtmlElement, Text, Window};

/// [`Dom`] over the live browser document.
#[derive(Debug, Clone)]
pub struct BrowserDom {
    window: Window,
    document: Document,
}

impl BrowserDom {
    pub fn new(window: Window) -> Result<Self, JsValue> {
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("window has no document"))?;
        Ok(Self { window, document })
    }

    pub fn window(&self) -> &Window {
        &self.window
    }

    pub fn document(&self) -> &Document {
        &self.document
    }
}

fn logged<T>(result: Result<T, JsValue>, action: &str) -> Option<T> {
    result
        .inspect_err(|e| tracing::warn!("{} failed: {:?}", action, e))
        .ok()
}

/// Doubles the leading newline of `pre`-like elements under `root`, which `outerHTML` drops
/// and the parser would swallow again.
fn restore_leading_newlines(root: &Element) {
    let mut elements = vec![root.clone()];
    if let Some(list) = logged(
        root.query_selector_all(&LEADING_NEWLINE_ELEMENTS.join(", ")),
        "querySelectorAll",
    ) {
        elements.extend((0..list.length()).filter_map(|i| list.item(i)?.dyn_into::<Element>().ok()));
    }

    for element in elements {
        if !LEADING_NEWLINE_ELEMENTS.contains(&element.local_name().as_str()) {
            continue;
        }
        if let Some(text) = element
            .first_child()
            .and_then(|child| child.dyn_into::<Text>().ok())
            .filter(|text| text.data().starts_with('\n'))
        {
            logged(text.insert_data(0, "\n"), "insertData");
        }
    }
}

impl Dom for BrowserDom {
    type Node = Element;

    fn query_selector(&self, selectors: &str) -> Option<Element> {
        logged(self.document.query_selector(selectors), "querySelector").flatten()
    }

    fn query_selector_in(&self, scope: &Element, selectors: &str) -> Option<Element> {
        logged(scope.query_selector(selectors), "querySelector").flatten()
    }

    fn closest(&self, node: &Element, selectors: &str) -> Option<Element> {
        logged(node.closest(selectors), "closest").flatten()
    }

    fn create_element(&self, tag_name: &str) -> Option<Element> {
        logged(self.document.create_element(tag_name), "createElement")
    }

    fn set_attribute(&self, node: &Element, name: &str, value: &str) {
        logged(node.set_attribute(name, value), "setAttribute");
    }

    fn add_class(&self, node: &Element, class: &str) {
        logged(node.class_list().add_1(class), "classList.add");
    }

    fn remove_class(&self, node: &Element, class: &str) {
        logged(node.class_list().remove_1(class), "classList.remove");
    }

    fn set_text_content(&self, node: &Element, text: &str) {
        node.set_text_content(Some(text));
    }

    fn set_inner_html(&self, node: &Element, html: &str) {
        node.set_inner_html(html);
    }

    fn text_content(&self, node: &Element) -> String {
        node.text_content().unwrap_or_default()
    }

    fn outer_html(&self, node: &Element) -> String {
        let Some(copy) = logged(node.clone_node_with_deep(true), "cloneNode")
            .and_then(|copy| copy.dyn_into::<Element>().ok())
        else {
            return node.outer_html();
        };
        restore_leading_newlines(&copy);
        copy.outer_html()
    }

    fn insert_before(&self, reference: &Element, node: &Element) {
        if let Some(parent) = reference.parent_node() {
            logged(parent.insert_before(node, Some(reference)), "insertBefore");
        }
    }

    fn append_child(&self, parent: &Element, child: &Element) {
        logged(parent.append_child(child), "appendChild");
    }

    fn remove(&self, node: &Element) {
        node.remove();
    }

    fn body(&self) -> Option<Element> {
        self.document.body().map(Element::from)
    }

    fn title(&self) -> String {
        copy_page::extract::normalize_whitespace(&self.document.title())
    }

    fn ready_state(&self) -> ReadyState {
        ReadyState::from_document_state(&self.document.ready_state())
    }

    fn computed_opacity(&self, node: &Element) -> f64 {
        logged(self.window.get_computed_style(node), "getComputedStyle")
            .flatten()
            .and_then(|style| logged(style.get_property_value("opacity"), "opacity"))
            .and_then(|opacity| opacity.trim().parse().ok())
            .unwrap_or(1.0)
    }

    fn force_layout(&self, node: &Element) {
        if let Some(element) = node.dyn_ref::<HtmlElement>() {
            let _ = element.offset_width();
        }
    }

    fn add_listener(&self, node: &Element, event: &str, listener: Listener) {
        let callback = Closure::<dyn Fn()>::new(move || listener());
        logged(
            node.add_event_listener_with_callback(event, callback.as_ref().unchecked_ref()),
            "addEventListener",
        );
        // Listeners live as long as the page.
        callback.forget();
    }

    fn add_document_listener(&self, event: &str, listener: Listener, once: bool) {
        let callback = Closure::<dyn Fn()>::new(move || listener());
        let options = AddEventListenerOptions::new();
        options.set_once(once);
        logged(
            self.document
                .add_event_listener_with_callback_and_add_event_listener_options(
                    event,
                    callback.as_ref().unchecked_ref(),
                    &options,
                ),
            "addEventListener",
        );
        callback.forget();
    }
}
