use crate::bus::EventListener;
use crate::envelope::Envelope;
use crate::event::FlowEvent;
use std::io::Write;
use std::sync::{Arc, Mutex};

/// The embedding context on the other side of the boundary.
pub trait HostFrame: Send + Sync {
    fn post_message(&self, message: &str) -> anyhow::Result<()>;
}

impl<H: HostFrame + ?Sized> HostFrame for Arc<H> {
    fn post_message(&self, message: &str) -> anyhow::Result<()> {
        (**self).post_message(message)
    }
}

/// Encodes each event as an [`Envelope`] and posts it to a host frame.
pub struct FrameListener<H> {
    frame: H,
    name: String,
}

impl<H: HostFrame> FrameListener<H> {
    pub fn new(frame: H) -> Self {
        Self {
            frame,
            name: "host-frame".to_string(),
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }
}

impl<H: HostFrame> EventListener for FrameListener<H> {
    fn name(&self) -> &str {
        &self.name
    }

    fn on_event(&self, event: &FlowEvent) -> anyhow::Result<()> {
        let message = Envelope::from_event(event)?.to_json()?;
        self.frame.post_message(&message)
    }
}

/// Newline-delimited JSON over any writer, e.g. stdout piped to a host.
pub struct WriterFrame<W> {
    writer: Mutex<W>,
}

impl<W: Write + Send> WriterFrame<W> {
    pub fn new(writer: W) -> Self {
        Self {
            writer: Mutex::new(writer),
        }
    }

    pub fn into_inner(self) -> W {
        self.writer
            .into_inner()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl<W: Write + Send> HostFrame for WriterFrame<W> {
    fn post_message(&self, message: &str) -> anyhow::Result<()> {
        let mut writer = self
            .writer
            .lock()
            .map_err(|_| anyhow::anyhow!("host writer lock poisoned"))?;
        writeln!(writer, "{}", message)?;
        writer.flush()?;
        Ok(())
    }
}
