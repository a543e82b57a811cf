use copy_page::Scheduler;
use copy_page::scheduler::{LocalFuture, Task};
use wasm_bindgen::prelude::*;
use web_sys::Window;

/// [`Scheduler`] backed by `setTimeout`, `requestAnimationFrame` and the microtask queue.
#[derive(Debug, Clone)]
pub struct BrowserScheduler {
    window: Window,
}

impl BrowserScheduler {
    pub fn new(window: Window) -> Self {
        Self { window }
    }
}

impl Scheduler for BrowserScheduler {
    fn set_timeout(&self, delay_ms: u32, task: Task) {
        let callback = Closure::once_into_js(move || task());
        let delay = i32::try_from(delay_ms).unwrap_or(i32::MAX);
        if let Err(e) = self
            .window
            .set_timeout_with_callback_and_timeout_and_arguments_0(callback.unchecked_ref(), delay)
        {
            tracing::warn!("setTimeout failed: {:?}", e);
        }
    }

    fn request_animation_frame(&self, task: Task) {
        let callback = Closure::once_into_js(move || task());
        if let Err(e) = self.window.request_animation_frame(callback.unchecked_ref()) {
            tracing::warn!("requestAnimationFrame failed: {:?}", e);
        }
    }

    fn spawn_local(&self, future: LocalFuture) {
        wasm_bindgen_futures::spawn_local(future);
    }
}
