//! JSON-lines host sink used by the `pointer-relay` binary.
//!
//! Each event becomes one line on the wrapped writer:
//!
//! ```text
//! {"event":"left-down","x":10,"y":20}
//! ```

use std::io::Write;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::warn;

use crate::application::dispatch::EventSink;

/// Wire shape of one emitted line.
#[derive(Debug, Serialize)]
struct HostEvent<'a> {
    event: &'a str,
    x: i32,
    y: i32,
}

/// An [`EventSink`] that writes one JSON object per line.
pub struct JsonLinesSink<W: Write + Send> {
    writer: Mutex<W>,
}

impl<W: Write + Send> JsonLinesSink<W> {
    /// Wraps `writer`.
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    /// Returns the wrapped writer.
    pub fn into_inner(self) -> W {
        self.writer.into_inner().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<W: Write + Send> EventSink for JsonLinesSink<W> {
    fn on_event(&self, name: &str, x: i32, y: i32) {
        let mut writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let line = HostEvent { event: name, x, y };
        let result = serde_json::to_writer(&mut *writer, &line)
            .map_err(std::io::Error::from)
            .and_then(|()| writer.write_all(b"\n"))
            .and_then(|()| writer.flush());
        if let Err(e) = result {
            warn!("failed to write event to sink: {e}");
        }
    }
}
