use std::cell::Cell;
use std::rc::Rc;

use crate::clipboard::ClipboardHost;
use crate::dom::{Dom, ReadyState};
use crate::mount::{CopyButton, Host, mount};
use crate::options::ButtonOptions;
use crate::scheduler::Scheduler;

/// Fired by Astro after every page load, including client-side navigations.
pub const PAGE_LOAD_EVENT: &str = "astro:page-load";
pub const DOM_CONTENT_LOADED_EVENT: &str = "DOMContentLoaded";

/// Per page-load state: whether the lifecycle listeners have been registered.
///
/// Soft navigations keep the same session, so listeners are registered at most once while
/// every lifecycle signal still tries to mount into the current document.
pub struct Session<D, S, C> {
    host: Host<D, S, C>,
    initialized: Cell<bool>,
}

impl<D, S, C> Session<D, S, C>
where
    D: Dom + 'static,
    S: Scheduler + 'static,
    C: ClipboardHost<Node = D::Node> + 'static,
{
    pub fn new(host: Host<D, S, C>) -> Self {
        Self {
            host,
            initialized: Cell::new(false),
        }
    }

    pub fn host(&self) -> &Host<D, S, C> {
        &self.host
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.get()
    }

    /// Registers lifecycle listeners on first use and mounts when the document is ready.
    ///
    /// Returns the button if this call mounted one.
    pub fn setup(&self, options: ButtonOptions) -> Option<Rc<CopyButton<D, S, C>>> {
        let options = Rc::new(options);

        if self.initialized.replace(true) {
            return mount(&self.host, options);
        }

        let host = self.host.clone();
        let page_options = Rc::clone(&options);
        self.host.dom.add_document_listener(
            PAGE_LOAD_EVENT,
            Rc::new(move || {
                mount(&host, Rc::clone(&page_options));
            }),
            false,
        );

        if self.host.dom.ready_state() == ReadyState::Loading {
            tracing::debug!("Document still loading, deferring mount");
            let host = self.host.clone();
            self.host.dom.add_document_listener(
                DOM_CONTENT_LOADED_EVENT,
                Rc::new(move || {
                    mount(&host, Rc::clone(&options));
                }),
                true,
            );
            None
        } else {
            mount(&self.host, options)
        }
    }
}
