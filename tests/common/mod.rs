//! In-memory printer for driving the print service without Bluetooth.

#![allow(dead_code)]

use std::io::{self, Read, Write};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use stocklabel::LabelError;
use stocklabel::printer::LabelProfile;
use stocklabel::protocol::status::STATUS_REQUEST;
use stocklabel::transport::{Connector, Link, PrinterDevice};

/// Everything the fake printer received, across all links.
#[derive(Default)]
pub struct Wire {
    pub bytes: Mutex<Vec<u8>>,
    pub connects: AtomicUsize,
}

impl Wire {
    pub fn bytes(&self) -> Vec<u8> {
        self.bytes.lock().unwrap().clone()
    }

    pub fn connects(&self) -> usize {
        self.connects.load(Ordering::SeqCst)
    }
}

pub struct FakeLink {
    wire: Arc<Wire>,
    reply: Vec<u8>,
    pending: Vec<u8>,
    write_delay: Duration,
}

impl Read for FakeLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = buf.len().min(self.pending.len());
        buf[..n].copy_from_slice(&self.pending[..n]);
        self.pending.drain(..n);
        Ok(n)
    }
}

impl Write for FakeLink {
    /// Writes land on the wire in small pieces so unserialized callers
    /// would visibly interleave.
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        if buf == STATUS_REQUEST {
            self.pending.extend_from_slice(&self.reply);
        }
        let n = buf.len().min(16);
        self.wire.bytes.lock().unwrap().extend_from_slice(&buf[..n]);
        if !self.write_delay.is_zero() {
            thread::sleep(self.write_delay);
        }
        Ok(n)
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

impl Link for FakeLink {
    fn bytes_available(&mut self) -> io::Result<usize> {
        Ok(self.pending.len())
    }
}

#[derive(Default)]
pub struct FakeConnector {
    pub wire: Arc<Wire>,
    /// Reply to every `~HS`
    pub reply: Vec<u8>,
    pub write_delay: Duration,
}

impl Connector for FakeConnector {
    type Link = FakeLink;

    fn stop_discovery(&self) -> Result<(), LabelError> {
        Ok(())
    }

    fn connect(&self, _device: &PrinterDevice) -> Result<FakeLink, LabelError> {
        self.wire.connects.fetch_add(1, Ordering::SeqCst);
        Ok(FakeLink {
            wire: self.wire.clone(),
            reply: self.reply.clone(),
            pending: Vec::new(),
            write_delay: self.write_delay,
        })
    }
}

/// Default profile with a short status window.
pub fn fast_profile() -> LabelProfile {
    LabelProfile {
        status_timeout_ms: 20,
        status_poll_ms: 2,
        ..LabelProfile::DEFAULT_58X40
    }
}
