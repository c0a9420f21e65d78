//! # Device Transport
//!
//! Sends raw printer-language bytes to a device node.
//!
//! | Device | Example | TTY |
//! |--------|---------|-----|
//! | USB printer class | `/dev/usb/lp0` | no |
//! | USB serial | `/dev/ttyUSB0` | yes |
//! | Bluetooth SPP | `/dev/rfcomm0` | yes |
//!
//! TTY devices are switched to raw mode so binary raster data is transmitted
//! without modification:
//!
//! - **No input processing**: IGNBRK, BRKINT, PARMRK, ISTRIP, INLCR, IGNCR, ICRNL
//! - **No flow control**: IXON, IXOFF, IXANY (0x11 / 0x13 occur in bitmaps)
//! - **No output processing**: OPOST
//! - **8-bit characters**: CS8, no parity
//! - **Non-canonical, no echo**: ICANON, ECHO, ECHONL, ISIG, IEXTEN off
//!
//! Non-TTY targets (printer class devices, plain files) are written as-is.
//!
//! Large jobs are written in chunks with a short pause between them so slow
//! serial links do not overrun the printer's receive buffer.

use std::fs::{File, OpenOptions};
use std::io::Write;
#[cfg(unix)]
use std::os::unix::io::AsRawFd;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Duration;

use crate::error::PrintError;

/// Default printer device path
pub const DEFAULT_DEVICE: &str = "/dev/usb/lp0";

/// Default chunk size for writes (bytes)
const CHUNK_SIZE: usize = 4096;

/// Delay between chunks (milliseconds)
const CHUNK_DELAY_MS: u64 = 2;

/// # Device Transport
///
/// ## Example
///
/// ```no_run
/// use labelkit::transport::DeviceTransport;
///
/// let mut transport = DeviceTransport::open("/dev/usb/lp0")?;
/// transport.write_all(b"N\r\nP1\r\n")?;
///
/// # Ok::<(), labelkit::error::PrintError>(())
/// ```
pub struct DeviceTransport {
    file: File,
    path: PathBuf,
    chunk_size: usize,
    chunk_delay: Duration,
}

impl DeviceTransport {
    /// Open a printer device for writing.
    ///
    /// ## Errors
    ///
    /// Returns an error if:
    /// - The device doesn't exist
    /// - Permission denied (may need the `lp` or `dialout` group)
    /// - TTY configuration fails
    pub fn open<P: AsRef<Path>>(device: P) -> Result<Self, PrintError> {
        let path = device.as_ref();

        let file = OpenOptions::new()
            .write(true)
            .create(false)
            .open(path)
            .map_err(|e| PrintError::Transport(format!("Failed to open {}: {}", path.display(), e)))?;

        prepare_raw(&file, path)?;

        Ok(Self {
            file,
            path: path.to_path_buf(),
            chunk_size: CHUNK_SIZE,
            chunk_delay: Duration::from_millis(CHUNK_DELAY_MS),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Set the chunk size for large writes. Default is 4096 bytes.
    pub fn set_chunk_size(&mut self, size: usize) {
        self.chunk_size = size.max(1);
    }

    /// Set the delay between chunks. Default is 2ms.
    pub fn set_chunk_delay(&mut self, delay: Duration) {
        self.chunk_delay = delay;
    }

    /// Write a whole job and flush.
    pub fn write_all(&mut self, data: &[u8]) -> Result<(), PrintError> {
        if data.len() <= self.chunk_size {
            self.file
                .write_all(data)
                .map_err(|e| PrintError::Transport(format!("Write failed: {}", e)))?;
        } else {
            for chunk in data.chunks(self.chunk_size) {
                self.file
                    .write_all(chunk)
                    .map_err(|e| PrintError::Transport(format!("Write failed: {}", e)))?;

                if !self.chunk_delay.is_zero() {
                    thread::sleep(self.chunk_delay);
                }
            }
        }

        self.file
            .flush()
            .map_err(|e| PrintError::Transport(format!("Flush failed: {}", e)))?;

        tracing::debug!(device = %self.path.display(), bytes = data.len(), "job written");
        Ok(())
    }
}

#[cfg(unix)]
fn prepare_raw(file: &File, path: &Path) -> Result<(), PrintError> {
    let fd = file.as_raw_fd();
    if unsafe { libc::isatty(fd) } == 1 {
        configure_tty_raw(fd)?;
        tracing::debug!(device = %path.display(), "configured tty for raw output");
    }
    Ok(())
}

// No termios here; the device is written as opened.
#[cfg(not(unix))]
fn prepare_raw(_file: &File, _path: &Path) -> Result<(), PrintError> {
    Ok(())
}

/// Put a TTY file descriptor into raw mode (see module docs).
#[cfg(unix)]
fn configure_tty_raw(fd: i32) -> Result<(), PrintError> {
    use std::mem::MaybeUninit;

    let mut termios = MaybeUninit::uninit();
    let result = unsafe { libc::tcgetattr(fd, termios.as_mut_ptr()) };
    if result != 0 {
        return Err(PrintError::Transport(format!(
            "tcgetattr failed: {}",
            std::io::Error::last_os_error()
        )));
    }
    let mut termios = unsafe { termios.assume_init() };

    termios.c_iflag &= !(libc::IGNBRK
        | libc::BRKINT
        | libc::PARMRK
        | libc::ISTRIP
        | libc::INLCR
        | libc::IGNCR
        | libc::ICRNL
        | libc::IXON
        | libc::IXOFF
        | libc::IXANY);
    termios.c_oflag &= !libc::OPOST;
    termios.c_lflag &= !(libc::ECHO | libc::ECHONL | libc::ICANON | libc::ISIG | libc::IEXTEN);
    termios.c_cflag &= !(libc::CSIZE | libc::PARENB);
    termios.c_cflag |= libc::CS8;

    let result = unsafe { libc::tcsetattr(fd, libc::TCSANOW, &termios) };
    if result != 0 {
        return Err(PrintError::Transport(format!(
            "tcsetattr failed: {}",
            std::io::Error::last_os_error()
        )));
    }

    Ok(())
}
