//! Raw-line terminal mode with guaranteed restore.
//!
//! Entering the mode hands back a guard; dropping the guard puts the
//! original settings back, whether the session ended cleanly, with an error,
//! or by panic.

use std::{io, mem::MaybeUninit, os::fd::RawFd};

/// Canonical mode and echo switched off on a terminal, restored on drop.
pub struct RawLineMode {
    fd: RawFd,
    original: libc::termios,
}

impl RawLineMode {
    /// Switch `fd` to per-character delivery without echo.
    ///
    /// Returns `Ok(None)` when `fd` is not a terminal, in which case nothing
    /// is touched.
    pub fn enter(fd: RawFd) -> io::Result<Option<Self>> {
        if unsafe { libc::isatty(fd) } != 1 {
            return Ok(None);
        }

        let mut original = MaybeUninit::<libc::termios>::uninit();
        if unsafe { libc::tcgetattr(fd, original.as_mut_ptr()) } < 0 {
            return Err(io::Error::last_os_error());
        }
        let original = unsafe { original.assume_init() };

        let mut settings = original;
        settings.c_lflag &= !(libc::ICANON | libc::ECHO);
        settings.c_cc[libc::VMIN] = 1;
        settings.c_cc[libc::VTIME] = 0;
        if unsafe { libc::tcsetattr(fd, libc::TCSANOW, &settings) } < 0 {
            return Err(io::Error::last_os_error());
        }

        log::debug!("terminal on fd {fd} switched to raw-line mode");
        Ok(Some(Self { fd, original }))
    }
}

impl Drop for RawLineMode {
    fn drop(&mut self) {
        if unsafe { libc::tcsetattr(self.fd, libc::TCSANOW, &self.original) } < 0 {
            log::warn!(
                "failed to restore terminal mode: {}",
                io::Error::last_os_error()
            );
        } else {
            log::debug!("terminal on fd {} restored", self.fd);
        }
    }
}
