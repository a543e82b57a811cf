use std::io::{self, Write};

use tracing::{Level, Metadata};
use tracing_subscriber::fmt::MakeWriter;

/// Forwards formatted log lines to the browser console, one console call per event.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleWriter {
    level: Level,
}

impl Default for ConsoleWriter {
    fn default() -> Self {
        Self { level: Level::INFO }
    }
}

impl Write for ConsoleWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let message = String::from_utf8_lossy(buf);
        let message = wasm_bindgen::JsValue::from_str(message.trim_end());

        match self.level {
            Level::ERROR => web_sys::console::error_1(&message),
            Level::WARN => web_sys::console::warn_1(&message),
            Level::INFO => web_sys::console::info_1(&message),
            Level::DEBUG => web_sys::console::debug_1(&message),
            _ => web_sys::console::log_1(&message),
        }

        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl<'a> MakeWriter<'a> for ConsoleWriter {
    type Writer = Self;

    fn make_writer(&'a self) -> Self::Writer {
        *self
    }

    fn make_writer_for(&'a self, meta: &Metadata<'_>) -> Self::Writer {
        Self {
            level: *meta.level(),
        }
    }
}

/// Installs the console subscriber. Later calls are no-ops.
pub fn init(max_level: Level) {
    let result = tracing_subscriber::fmt()
        .with_max_level(max_level)
        .without_time()
        .with_ansi(false)
        .with_target(false)
        .with_writer(ConsoleWriter::default())
        .try_init();

    if result.is_err() {
        tracing::trace!("Console subscriber already installed");
    }
}
