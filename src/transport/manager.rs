//! # Printer Connection Manager
//!
//! Owns at most one open link, remembers which printer it belongs to, and
//! runs every print through a single lock.
//!
//! ## Print Sequence
//!
//! ```text
//! lock
//!  ├─ ensure_connected   reuse cached link for the same address, else reconnect
//!  ├─ probe              ~HS, poll for a reply, look for fault phrases
//!  ├─ write + flush      the label's command stream
//! unlock
//! ```
//!
//! ## Failure Handling
//!
//! | Failure | Error | Cached link |
//! |---------|-------|-------------|
//! | No connect permission | `Permission` | untouched |
//! | Connect fails | `Connection` | none |
//! | Probe I/O fails | `Connection` | closed |
//! | Printer reports a fault | `NotReady` | kept |
//! | Write or flush fails | `Transmission` | closed |
//!
//! Nothing is retried.

use std::io::{self, Read, Write};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Instant;

use serde::Serialize;
use tracing::{debug, info, warn};

use super::{Connector, Link, PermissionProvider, PrinterDevice};
use crate::error::LabelError;
use crate::label::Label;
use crate::label::builder;
use crate::printer::{LabelProfile, ReadinessPolicy};
use crate::protocol::status::{NotReadyReason, STATUS_REQUEST, parse_status};

/// Outcome of a status probe.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "reason", rename_all = "snake_case")]
pub enum Readiness {
    Ready,
    NotReady(NotReadyReason),
}

impl Readiness {
    pub fn is_ready(&self) -> bool {
        matches!(self, Readiness::Ready)
    }
}

/// Ask the printer for its status and decide whether it can print.
///
/// Writes `~HS\r\n`, then polls for reply bytes every `status_poll_ms` for
/// at most `status_timeout_ms`. Replies over Bluetooth can arrive in pieces
/// with quiet polls in between, so only a matched fault phrase ends the
/// window early. Everything collected by the deadline is inspected.
pub fn is_ready<L: Link + ?Sized>(link: &mut L, profile: &LabelProfile) -> io::Result<Readiness> {
    link.write_all(STATUS_REQUEST)?;
    link.flush()?;

    let deadline = Instant::now() + profile.status_timeout();
    let mut reply = Vec::new();
    let mut chunk = [0u8; 256];

    loop {
        let available = link.bytes_available()?;
        if available > 0 {
            let want = available.min(chunk.len());
            let n = link.read(&mut chunk[..want])?;
            reply.extend_from_slice(&chunk[..n]);
            if parse_status(&reply).is_some() {
                break;
            }
        }

        if Instant::now() >= deadline {
            break;
        }
        thread::sleep(profile.status_poll());
    }

    if reply.is_empty() {
        return Ok(match profile.readiness {
            ReadinessPolicy::FailOpen => Readiness::Ready,
            ReadinessPolicy::Strict => Readiness::NotReady(NotReadyReason::NoResponse),
        });
    }

    debug!(reply = %String::from_utf8_lossy(&reply).trim(), "status reply");
    Ok(match parse_status(&reply) {
        Some(reason) => Readiness::NotReady(reason),
        None => Readiness::Ready,
    })
}

struct CachedLink<L> {
    address: String,
    link: L,
}

/// # Connection Manager
///
/// Connection state for one printer link. Not synchronized on its own;
/// [`PrintService`] puts it behind a mutex.
pub struct ConnectionManager<C: Connector> {
    connector: C,
    permissions: Arc<dyn PermissionProvider>,
    profile: LabelProfile,
    cached: Option<CachedLink<C::Link>>,
}

impl<C: Connector> ConnectionManager<C> {
    pub fn new(connector: C, permissions: Arc<dyn PermissionProvider>, profile: LabelProfile) -> Self {
        Self {
            connector,
            permissions,
            profile,
            cached: None,
        }
    }

    pub fn profile(&self) -> &LabelProfile {
        &self.profile
    }

    /// Address of the cached link, if any.
    pub fn connected_address(&self) -> Option<&str> {
        self.cached.as_ref().map(|c| c.address.as_str())
    }

    /// Return an open link to `device`, reusing the cached one when it is
    /// open and bound to the same address.
    pub fn ensure_connected(&mut self, device: &PrinterDevice) -> Result<&mut C::Link, LabelError> {
        if !self.permissions.has_connect_permission() {
            return Err(LabelError::Permission(
                "Bluetooth connect permission not granted".to_string(),
            ));
        }

        let reusable = matches!(
            &self.cached,
            Some(cached) if cached.address == device.address && cached.link.is_open()
        );

        if !reusable {
            self.close();
            self.halt_discovery();

            let link = self.connector.connect(device).map_err(|e| match e {
                LabelError::Permission(_) | LabelError::Connection(_) => e,
                other => LabelError::Connection(other.to_string()),
            })?;
            info!(device = %device, "printer connected");
            self.cached = Some(CachedLink {
                address: device.address.clone(),
                link,
            });
        } else {
            debug!(device = %device, "reusing printer connection");
        }

        match self.cached.as_mut() {
            Some(cached) => Ok(&mut cached.link),
            None => Err(LabelError::Connection("No printer link".to_string())),
        }
    }

    fn halt_discovery(&self) {
        if !self.permissions.has_scan_permission() {
            return;
        }
        if let Err(e) = self.connector.stop_discovery() {
            debug!(error = %e, "could not stop discovery");
        }
    }

    /// Probe the printer behind `device`.
    pub fn probe(&mut self, device: &PrinterDevice) -> Result<Readiness, LabelError> {
        let profile = self.profile;
        let link = self.ensure_connected(device)?;
        match is_ready(link, &profile) {
            Ok(readiness) => Ok(readiness),
            Err(e) => {
                self.close();
                Err(LabelError::Connection(format!("Status probe failed: {}", e)))
            }
        }
    }

    /// Probe, then send `data` to `device` if the printer is ready.
    pub fn send(&mut self, device: &PrinterDevice, data: &[u8]) -> Result<usize, LabelError> {
        if let Readiness::NotReady(reason) = self.probe(device)? {
            warn!(device = %device, %reason, "printer not ready");
            return Err(LabelError::NotReady(reason));
        }

        let link = self.ensure_connected(device)?;
        let written = link.write_all(data).and_then(|_| link.flush());
        if let Err(e) = written {
            self.close();
            return Err(LabelError::Transmission(format!(
                "Failed to send {} bytes: {}",
                data.len(),
                e
            )));
        }

        info!(device = %device, bytes = data.len(), "label sent");
        Ok(data.len())
    }

    /// Close and forget the cached link.
    pub fn close(&mut self) {
        if let Some(cached) = self.cached.take() {
            debug!(address = %cached.address, "closing printer connection");
        }
    }
}

/// # Print Service
///
/// Thread-safe front of [`ConnectionManager`]. Every operation holds the
/// same lock, so jobs never interleave on the wire.
///
/// ## Example
///
/// ```no_run
/// use std::sync::Arc;
/// use stocklabel::label::Label;
/// use stocklabel::printer::LabelProfile;
/// use stocklabel::transport::{PrintService, PrinterDevice, RfcommConnector, StaticPermissions};
///
/// let service = PrintService::new(
///     RfcommConnector::default(),
///     Arc::new(StaticPermissions::granted()),
///     LabelProfile::default(),
/// );
/// let device = PrinterDevice::new("00:11:62:AA:BB:CC");
/// service.print(&device, &Label::fixed_text("4006381333931", Some("Hex bolt M8")))?;
/// # Ok::<(), stocklabel::LabelError>(())
/// ```
pub struct PrintService<C: Connector> {
    manager: Mutex<ConnectionManager<C>>,
}

impl<C: Connector> PrintService<C> {
    pub fn new(connector: C, permissions: Arc<dyn PermissionProvider>, profile: LabelProfile) -> Self {
        Self {
            manager: Mutex::new(ConnectionManager::new(connector, permissions, profile)),
        }
    }

    fn lock(&self) -> MutexGuard<'_, ConnectionManager<C>> {
        // A panic mid-print leaves nothing half-updated that matters
        self.manager.lock().unwrap_or_else(PoisonError::into_inner)
    }

    pub fn profile(&self) -> LabelProfile {
        *self.lock().profile()
    }

    /// Print one copy of `label` on `device`. Returns the bytes sent.
    pub fn print(&self, device: &PrinterDevice, label: &Label) -> Result<usize, LabelError> {
        let mut manager = self.lock();
        let bytes = builder::build(label, manager.profile())?.to_bytes();
        debug!(label = %label.summary(), bytes = bytes.len(), "label built");
        manager.send(device, &bytes)
    }

    /// Probe `device` without printing.
    pub fn status(&self, device: &PrinterDevice) -> Result<Readiness, LabelError> {
        self.lock().probe(device)
    }

    /// Close the cached link, if any.
    pub fn disconnect(&self) {
        self.lock().close();
    }

    pub fn connected_address(&self) -> Option<String> {
        self.lock().connected_address().map(str::to_string)
    }
}

// ============================================================================
// TESTS
// ============================================================================
