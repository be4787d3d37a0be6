use std::io;
use std::os::unix::io::RawFd;

use log::{debug, warn};
use termios::{tcsetattr, Termios, ECHO, ICANON, TCSANOW, VMIN, VTIME};

/// Puts a terminal into character-at-a-time mode for as long as it lives.
///
/// The settings found on `acquire` are written back when the guard is
/// dropped, whichever way the owner leaves its scope. Signal generation
/// (`ISIG`) stays on so Ctrl+C still reaches the process.
pub struct TerminalGuard {
    fd: RawFd,
    saved: Termios,
}

impl TerminalGuard {
    pub fn acquire(fd: RawFd) -> io::Result<Self> {
        let saved = Termios::from_fd(fd)?;
        let mut raw = saved;
        // no echo and no line buffering
        raw.c_lflag &= !(ICANON | ECHO);
        raw.c_cc[VMIN] = 1;
        raw.c_cc[VTIME] = 0;
        tcsetattr(fd, TCSANOW, &raw)?;
        debug!("terminal fd {} switched to raw input", fd);
        Ok(Self { fd, saved })
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        match tcsetattr(self.fd, TCSANOW, &self.saved) {
            Ok(()) => debug!("terminal fd {} restored", self.fd),
            Err(err) => warn!("failed to restore terminal fd {}: {}", self.fd, err),
        }
    }
}

/// Columns and rows of the controlling terminal, if there is one.
pub fn window_size() -> Option<(u16, u16)> {
    match crossterm::terminal::size() {
        Ok((0, _)) | Ok((_, 0)) => None,
        Ok(size) => Some(size),
        Err(err) => {
            debug!("terminal size unavailable: {}", err);
            None
        }
    }
}

/// Grid that fills a terminal of `cols` x `rows`: two columns per cell, and a
/// few rows kept free for the score line and banners.
pub fn grid_for_window(cols: u16, rows: u16) -> (i32, i32) {
    (i32::from(cols) / 2, i32::from(rows) - 4)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::os::unix::io::AsRawFd;
    use std::os::unix::net::UnixStream;

    #[test]
    fn test_acquire_fails_on_non_tty() {
        let (a, _b) = UnixStream::pair().unwrap();
        assert!(TerminalGuard::acquire(a.as_raw_fd()).is_err());
    }

    #[test]
    fn test_grid_for_window() {
        assert_eq!(grid_for_window(80, 24), (40, 20));
        assert_eq!(grid_for_window(81, 30), (40, 26));
    }
}
