//! # Bluetooth RFCOMM Transport
//!
//! This module provides communication with label printers over Bluetooth
//! Serial Port Profile (SPP) via RFCOMM.
//!
//! ## Device Addresses
//!
//! A printer is addressed either by its MAC (`00:11:62:AA:BB:CC`) or by an
//! already bound tty (`/dev/rfcomm0`). For a MAC, an existing binding is
//! looked up first; without one the printer is connected and bound:
//!
//! ```bash
//! $ bluetoothctl connect 00:11:62:AA:BB:CC
//! $ l2ping -c 1 00:11:62:AA:BB:CC
//! $ sudo rfcomm bind 0 00:11:62:AA:BB:CC 1
//! # This creates /dev/rfcomm0
//! ```
//!
//! ## TTY Configuration
//!
//! The RFCOMM device is opened in raw mode to ensure binary data is
//! transmitted without modification:
//!
//! - **No input processing**: Disable IGNBRK, BRKINT, PARMRK, ISTRIP, etc.
//! - **No output processing**: Disable OPOST (no CR/LF translation)
//! - **8-bit characters**: CS8 (8 data bits, no parity)
//! - **No echo**: Disable ECHO, ECHONL
//! - **Non-canonical mode**: Disable ICANON (no line buffering)
//! - **Non-blocking reads**: VMIN = 0, VTIME = 0, so status polling never
//!   stalls on a silent printer
//!
//! ## Chunked Writes
//!
//! Raster labels can be well over 100 KB. Large writes go out in 4096-byte
//! chunks with a short pause between them so the printer's buffer keeps up.

use std::fs::{self, File, OpenOptions};
use std::io::{self, Read, Write};
use std::os::unix::io::AsRawFd;
use std::path::Path;
use std::process::Command;
use std::thread;
use std::time::Duration;

use tracing::{debug, info, warn};

use super::{Connector, Link, PrinterDevice};
use crate::error::LabelError;

/// Default RFCOMM device path
pub const DEFAULT_DEVICE: &str = "/dev/rfcomm0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// SPP service channel on the printer
const SPP_CHANNEL: &str = "1";

/// Pause after `bluetoothctl connect` and `rfcomm bind`
const BIND_SETTLE: Duration = Duration::from_millis(500);

/// # RFCOMM Link
///
/// An open, raw-mode RFCOMM tty.
///
/// ## Example
///
/// ```no_run
/// use std::io::Write;
/// use stocklabel::transport::bluetooth::RfcommLink;
///
/// let mut link = RfcommLink::open("/dev/rfcomm0")?;
/// link.write_all(b"~HS\r\n")?;
/// # Ok::<(), stocklabel::LabelError>(())
/// ```
pub struct RfcommLink {
    file: File,
    /// Set once any read or write on the tty fails
    failed: bool,
}

impl RfcommLink {
    /// Open an RFCOMM tty for reading and writing.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need root or dialout group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, LabelError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .open(path)
            .map_err(|e| {
                LabelError::Connection(format!("Failed to open {}: {}", path.display(), e))
            })?;

        configure_tty_raw(file.as_raw_fd())?;

        Ok(Self {
            file,
            failed: false,
        })
    }

    fn track<T>(&mut self, result: io::Result<T>) -> io::Result<T> {
        if result.is_err() {
            self.failed = true;
        }
        result
    }
}

impl Read for RfcommLink {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let result = self.file.read(buf);
        self.track(result)
    }
}

impl Write for RfcommLink {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let result = self.file.write(buf);
        self.track(result)
    }

    fn write_all(&mut self, data: &[u8]) -> io::Result<()> {
        for (i, chunk) in data.chunks(CHUNK_SIZE).enumerate() {
            if i > 0 {
                thread::sleep(Duration::from_millis(CHUNK_DELAY_MS));
            }
            let result = self.file.write_all(chunk);
            self.track(result)?;
        }
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        let result = self.file.flush();
        self.track(result)
    }
}

impl Link for RfcommLink {
    fn bytes_available(&mut self) -> io::Result<usize> {
        let result = bytes_available(self.file.as_raw_fd());
        self.track(result)
    }

    fn is_open(&self) -> bool {
        !self.failed && !hung_up(self.file.as_raw_fd())
    }
}

/// Whether the remote end of the tty has gone away.
#[cfg(unix)]
fn hung_up(fd: i32) -> bool {
    let mut pfd = libc::pollfd {
        fd,
        events: 0,
        revents: 0,
    };
    // Zero timeout: only report what the kernel already knows
    let result = unsafe { libc::poll(&mut pfd, 1, 0) };
    if result < 0 {
        return true;
    }
    pfd.revents & (libc::POLLHUP | libc::POLLERR | libc::POLLNVAL) != 0
}

#[cfg(not(unix))]
fn hung_up(_fd: i32) -> bool {
    false
}

#[cfg(unix)]
fn bytes_available(fd: i32) -> io::Result<usize> {
    let mut count: libc::c_int = 0;
    let result = unsafe { libc::ioctl(fd, libc::FIONREAD, &mut count as *mut libc::c_int) };
    if result != 0 {
        return Err(io::Error::last_os_error());
    }
    Ok(count.max(0) as usize)
}

#[cfg(not(unix))]
fn bytes_available(_fd: i32) -> io::Result<usize> {
    Ok(0)
}

/// Input flags cleared for raw mode. XON/XOFF must be off: 0x11 and 0x13
/// occur in bitmap payloads.
#[cfg(unix)]
const RAW_IFLAG_OFF: libc::tcflag_t = libc::IGNBRK
    | libc::BRKINT
    | libc::PARMRK
    | libc::ISTRIP
    | libc::INLCR
    | libc::IGNCR
    | libc::ICRNL
    | libc::IXON
    | libc::IXOFF
    | libc::IXANY;

#[cfg(unix)]
const RAW_LFLAG_OFF: libc::tcflag_t =
    libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN;

/// Switch `termios` to raw 8N1 with non-blocking reads.
#[cfg(unix)]
fn make_raw(termios: &mut libc::termios) {
    termios.c_iflag &= !RAW_IFLAG_OFF;
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !RAW_LFLAG_OFF;
    termios.c_cflag = (termios.c_cflag & !(libc::CSIZE | libc::PARENB))
        | libc::CS8
        | libc::CREAD
        | libc::CLOCAL;
    termios.c_cc[libc::VMIN] = 0;
    termios.c_cc[libc::VTIME] = 0;
}

#[cfg(unix)]
fn tty_call(name: &str, result: libc::c_int) -> Result<(), LabelError> {
    if result == 0 {
        Ok(())
    } else {
        Err(LabelError::Connection(format!(
            "{} failed: {}",
            name,
            io::Error::last_os_error()
        )))
    }
}

#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), LabelError> {
    let mut termios = std::mem::MaybeUninit::<libc::termios>::uninit();
    tty_call("tcgetattr", unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) })?;
    let mut termios = unsafe { termios.assume_init() };

    make_raw(&mut termios);
    tty_call("tcsetattr", unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) })
}

#[cfg(not(unix))]
fn configure_tty_raw(_fd: i32) -> Result<(), LabelError> {
    Ok(())
}

// ============================================================================
// CONNECTOR
// ============================================================================

/// Opens [`RfcommLink`]s, binding RFCOMM devices on demand.
#[derive(Debug, Clone, Default)]
pub struct RfcommConnector {
    /// RFCOMM device number used when a MAC has no binding yet
    pub bind_channel: u8,
}

impl RfcommConnector {
    /// Resolve a device address to a tty path.
    pub fn resolve(&self, address: &str) -> Result<String, LabelError> {
        if address.starts_with("/dev/") {
            return Ok(address.to_string());
        }
        if !is_valid_mac(address) {
            return Err(LabelError::Connection(format!(
                "Not a Bluetooth address or device path: {}",
                address
            )));
        }
        match find_rfcomm_for_mac(address)? {
            Some(path) => {
                debug!(mac = address, device = %path, "using existing rfcomm binding");
                Ok(path)
            }
            None => setup_rfcomm(address, self.bind_channel),
        }
    }
}

impl Connector for RfcommConnector {
    type Link = RfcommLink;

    fn stop_discovery(&self) -> Result<(), LabelError> {
        run_checked("bluetoothctl", &["scan", "off"]).map(drop)
    }

    fn connect(&self, device: &PrinterDevice) -> Result<RfcommLink, LabelError> {
        let path = self.resolve(&device.address)?;
        let link = RfcommLink::open(&path)?;
        info!(device = %device, tty = %path, "rfcomm link open");
        Ok(link)
    }
}

// ============================================================================
// RFCOMM SETUP HELPERS
// ============================================================================

/// Validate a Bluetooth MAC address format (XX:XX:XX:XX:XX:XX).
pub fn is_valid_mac(mac: &str) -> bool {
    let parts: Vec<&str> = mac.split(':').collect();
    if parts.len() != 6 {
        return false;
    }
    parts
        .iter()
        .all(|part| part.len() == 2 && part.chars().all(|c| c.is_ascii_hexdigit()))
}

/// Pick the `/dev/rfcommN` path bound to `mac` out of a binding listing.
///
/// Both `/proc/net/rfcomm` and `rfcomm -a` print one binding per line,
/// starting with `rfcommN:` and containing the remote address.
fn binding_for_mac(listing: &str, mac: &str) -> Option<String> {
    let mac_upper = mac.to_uppercase();
    listing
        .lines()
        .filter(|line| line.to_uppercase().contains(&mac_upper))
        .filter_map(|line| line.split(':').next())
        .map(|name| format!("/dev/{}", name.trim()))
        .find(|path| Path::new(path).exists())
}

/// Run a Bluetooth tool and collect its output.
fn run_tool(program: &str, args: &[&str]) -> Result<std::process::Output, LabelError> {
    Command::new(program)
        .args(args)
        .output()
        .map_err(|e| LabelError::Connection(format!("Failed to run {}: {}", program, e)))
}

/// Like [`run_tool`], but a non-zero exit is an error carrying stderr.
fn run_checked(program: &str, args: &[&str]) -> Result<String, LabelError> {
    let output = run_tool(program, args)?;
    if !output.status.success() {
        return Err(LabelError::Connection(format!(
            "{} {} failed: {}",
            program,
            args.join(" "),
            String::from_utf8_lossy(&output.stderr).trim()
        )));
    }
    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

/// Find the tty already bound to `mac`: `/proc/net/rfcomm` first, then
/// `rfcomm -a`.
#[cfg(unix)]
pub fn find_rfcomm_for_mac(mac: &str) -> Result<Option<String>, LabelError> {
    let from_proc = fs::read_to_string("/proc/net/rfcomm")
        .ok()
        .and_then(|listing| binding_for_mac(&listing, mac));
    if from_proc.is_some() {
        return Ok(from_proc);
    }

    let output = run_tool("rfcomm", &["-a"])?;
    Ok(binding_for_mac(&String::from_utf8_lossy(&output.stdout), mac))
}

#[cfg(not(unix))]
pub fn find_rfcomm_for_mac(_mac: &str) -> Result<Option<String>, LabelError> {
    Ok(None)
}

/// Bind `/dev/rfcomm<channel>` to a printer that has no binding yet.
///
/// The printer is asked to connect, must answer one `l2ping`, and is then
/// bound on its SPP channel. Binding needs root.
#[cfg(unix)]
pub fn setup_rfcomm(mac: &str, channel: u8) -> Result<String, LabelError> {
    let mac = mac.to_uppercase();
    let device_path = format!("/dev/rfcomm{}", channel);

    // An already connected printer answers with an error here; l2ping decides
    let reply = String::from_utf8_lossy(&run_tool("bluetoothctl", &["connect", &mac])?.stdout)
        .into_owned();
    if reply.contains("Connection successful") || reply.contains("already connected") {
        debug!(mac = %mac, "bluetoothctl connected");
    } else {
        warn!(mac = %mac, reply = %reply.trim(), "bluetoothctl connect did not confirm");
    }
    thread::sleep(BIND_SETTLE);

    run_checked("l2ping", &["-c", "1", &mac])
        .map_err(|e| LabelError::Connection(format!("Printer {} not reachable: {}", mac, e)))?;
    run_checked("rfcomm", &["bind", &channel.to_string(), &mac, SPP_CHANNEL])?;
    thread::sleep(BIND_SETTLE);

    if !Path::new(&device_path).exists() {
        return Err(LabelError::Connection(format!(
            "rfcomm bind did not create {}",
            device_path
        )));
    }

    info!(mac = %mac, device = %device_path, "rfcomm bound");
    Ok(device_path)
}

#[cfg(not(unix))]
pub fn setup_rfcomm(_mac: &str, _channel: u8) -> Result<String, LabelError> {
    Err(LabelError::Connection(
        "RFCOMM setup not supported on this platform".to_string(),
    ))
}

// ============================================================================
// TESTS
// ============================================================================
