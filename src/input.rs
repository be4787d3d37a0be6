use std::io::{self, Stdin};
use std::os::fd::{AsFd, AsRawFd, RawFd};
use std::thread;
use std::time::Duration;

use circular_buffer::CircularBuffer;
use log::{debug, warn};
use nix::errno::Errno;
use nix::poll::{poll, PollFd, PollFlags, PollTimeout};
use nix::unistd::read;

use crate::symbol::{Symbol, ESCAPE_PREFIX};

const READ_CHUNK: usize = 16;
// longest sequence we decode is an arrow key: ESC [ X
const ESCAPE_LEN: usize = 3;

type InputBuffer = CircularBuffer<256, u8>;

/// Cursor position inside a move script.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScriptProgress {
    pub index: usize,
    pub total: usize,
}

impl ScriptProgress {
    pub fn remaining(&self) -> usize {
        self.total - self.index
    }
}

/// Where the game loop gets its symbols from.
pub trait InputSource {
    /// Next decoded symbol, waiting at most `timeout` for one to show up.
    fn next(&mut self, timeout: Duration) -> Option<Symbol>;

    /// True once a finite source has nothing left to give.
    fn is_exhausted(&self) -> bool {
        false
    }

    fn progress(&self) -> Option<ScriptProgress> {
        None
    }

    /// Terminal that should be put in raw mode while the session runs.
    fn terminal_fd(&self) -> Option<RawFd> {
        None
    }
}

/// Replays a fixed move sequence, one symbol per tick.
#[derive(Debug, Clone)]
pub struct ScriptedInput {
    moves: Vec<char>,
    cursor: usize,
}

impl ScriptedInput {
    pub fn new(moves: &str) -> Self {
        Self {
            moves: moves.chars().collect(),
            cursor: 0,
        }
    }
}

impl InputSource for ScriptedInput {
    fn next(&mut self, _timeout: Duration) -> Option<Symbol> {
        let c = *self.moves.get(self.cursor)?;
        self.cursor += 1;
        Some(Symbol::from_char(c))
    }

    fn is_exhausted(&self) -> bool {
        self.cursor >= self.moves.len()
    }

    fn progress(&self) -> Option<ScriptProgress> {
        Some(ScriptProgress {
            index: self.cursor,
            total: self.moves.len(),
        })
    }
}

/// Live keystrokes read byte by byte from a file descriptor.
///
/// Bytes that arrive together (a fast typist, or an arrow key followed by
/// another key) stay queued and are handed out one symbol per call. An arrow
/// sequence split across reads is stitched back together: the `ESC` or
/// `ESC [` already handed out as [`Symbol::Unrecognized`] is remembered in
/// `carried` until the rest of the sequence shows up.
pub struct InteractiveInput<F: AsFd = Stdin> {
    source: F,
    pending: InputBuffer,
    carried: usize,
    closed: bool,
}

impl InteractiveInput<Stdin> {
    pub fn stdin() -> Self {
        Self::new(io::stdin())
    }
}

impl<F: AsFd> InteractiveInput<F> {
    pub fn new(source: F) -> Self {
        Self {
            source,
            pending: InputBuffer::new(),
            carried: 0,
            closed: false,
        }
    }

    fn wait_readable(&self, timeout: Duration) -> io::Result<bool> {
        let millis = u16::try_from(timeout.as_millis()).unwrap_or(u16::MAX);
        let mut fds = [PollFd::new(self.source.as_fd(), PollFlags::POLLIN)];
        match poll(&mut fds, PollTimeout::from(millis)) {
            Ok(ready) => Ok(ready > 0),
            Err(Errno::EINTR) => Ok(false),
            Err(err) => Err(err.into()),
        }
    }

    fn fill(&mut self) -> io::Result<usize> {
        let mut chunk = [0u8; READ_CHUNK];
        let n = match read(self.source.as_fd().as_raw_fd(), &mut chunk) {
            Ok(n) => n,
            Err(Errno::EINTR | Errno::EAGAIN) => return Ok(0),
            Err(err) => return Err(err.into()),
        };
        if n == 0 {
            debug!("input reached end of file");
            self.closed = true;
            return Ok(0);
        }
        for &byte in &chunk[..n] {
            // if the buffer is full, drop the input
            if self.pending.is_full() {
                break;
            }
            self.pending.push_back(byte);
        }
        Ok(n)
    }

    /// The carried escape prefix followed by as many pending bytes as fit.
    fn window(&self) -> ([u8; ESCAPE_LEN], usize) {
        let mut bytes = [0u8; ESCAPE_LEN];
        bytes[..self.carried].copy_from_slice(&ESCAPE_PREFIX[..self.carried]);
        let mut len = self.carried;
        for (slot, byte) in bytes[len..].iter_mut().zip(self.pending.iter()) {
            *slot = *byte;
            len += 1;
        }
        (bytes, len)
    }

    fn is_partial_escape(bytes: &[u8]) -> bool {
        !bytes.is_empty() && bytes.len() < ESCAPE_LEN && ESCAPE_PREFIX.starts_with(bytes)
    }

    fn discard(&mut self, count: usize) {
        for _ in 0..count {
            self.pending.pop_front();
        }
    }

    fn decode_pending(&mut self) -> Option<Symbol> {
        let (bytes, len) = self.window();
        if len == self.carried {
            return None;
        }
        let window = &bytes[..len];

        if Self::is_partial_escape(window) {
            self.discard(len - self.carried);
            self.carried = len;
            return Some(Symbol::Unrecognized);
        }

        let (symbol, used) = Symbol::decode(window)?;
        if used <= self.carried {
            // the carried prefix went nowhere, decode the fresh bytes on their own
            self.carried = 0;
            return self.decode_pending();
        }
        self.discard(used - self.carried);
        self.carried = 0;
        Some(symbol)
    }

    fn read_symbol(&mut self, timeout: Duration) -> io::Result<Option<Symbol>> {
        if self.pending.is_empty() {
            if self.closed {
                // nothing will ever arrive, still honour the wait
                thread::sleep(timeout);
                return Ok(None);
            }
            if !self.wait_readable(timeout)? {
                return Ok(None);
            }
            self.fill()?;
        }

        // escape prefix: grab the rest of the sequence if it is already there
        let (bytes, len) = self.window();
        if Self::is_partial_escape(&bytes[..len])
            && !self.closed
            && self.wait_readable(Duration::ZERO)?
        {
            self.fill()?;
        }

        Ok(self.decode_pending())
    }
}

impl<F: AsFd> InputSource for InteractiveInput<F> {
    fn next(&mut self, timeout: Duration) -> Option<Symbol> {
        match self.read_symbol(timeout) {
            Ok(symbol) => {
                if let Some(symbol) = symbol {
                    debug!("key decoded as {}", symbol);
                }
                symbol
            }
            Err(err) => {
                warn!("reading input failed: {}", err);
                None
            }
        }
    }

    fn is_exhausted(&self) -> bool {
        self.closed && self.pending.is_empty()
    }

    fn terminal_fd(&self) -> Option<RawFd> {
        Some(self.source.as_fd().as_raw_fd())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::direction::Direction;
    use std::io::Write;
    use std::os::unix::net::UnixStream;
    use std::time::Instant;

    const SHORT: Duration = Duration::from_millis(20);

    #[test]
    fn test_script_decodes_in_order() {
        let mut input = ScriptedInput::new("6.8q");

        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Right)));
        assert_eq!(input.next(SHORT), Some(Symbol::Wait));
        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Up)));
        assert!(!input.is_exhausted());
        assert_eq!(input.next(SHORT), Some(Symbol::Quit));
        assert!(input.is_exhausted());
        assert_eq!(input.next(SHORT), None);
        // cursor never runs past the end
        assert_eq!(input.progress(), Some(ScriptProgress { index: 4, total: 4 }));
    }

    #[test]
    fn test_empty_script_is_exhausted() {
        let input = ScriptedInput::new("");
        assert!(input.is_exhausted());
        assert_eq!(input.progress().map(|p| p.remaining()), Some(0));
        assert_eq!(input.terminal_fd(), None);
    }

    #[test]
    fn test_interactive_times_out() {
        let (reader, _writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        let started = Instant::now();
        assert_eq!(input.next(SHORT), None);
        assert!(started.elapsed() >= SHORT);
        assert!(!input.is_exhausted());
    }

    #[test]
    fn test_interactive_arrow_keys() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        writer.write_all(b"\x1b[A\x1b[D").unwrap();

        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Up)));
        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Left)));
        assert_eq!(input.next(SHORT), None);
    }

    #[test]
    fn test_interactive_mixed_keys_one_per_call() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        writer.write_all(b"8x+q").unwrap();

        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Up)));
        assert_eq!(input.next(SHORT), Some(Symbol::Unrecognized));
        assert_eq!(input.next(SHORT), Some(Symbol::SpeedUp));
        assert_eq!(input.next(SHORT), Some(Symbol::Quit));
    }

    #[test]
    fn test_lone_escape_does_not_block() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        writer.write_all(b"\x1b").unwrap();

        let started = Instant::now();
        assert_eq!(input.next(Duration::from_secs(1)), Some(Symbol::Unrecognized));
        assert!(started.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn test_arrow_split_across_reads() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        writer.write_all(b"\x1b").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Unrecognized));
        writer.write_all(b"[").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Unrecognized));
        writer.write_all(b"D").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Left)));
        assert_eq!(input.next(SHORT), None);
    }

    #[test]
    fn test_arrow_tail_arrives_late() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        writer.write_all(b"\x1b").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Unrecognized));
        writer.write_all(b"[B").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Down)));
        assert_eq!(input.next(SHORT), None);
    }

    #[test]
    fn test_escape_then_plain_key() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);

        writer.write_all(b"\x1b").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Unrecognized));
        // not part of a sequence, so `d` keeps its own meaning
        writer.write_all(b"d").unwrap();
        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Down)));
    }

    #[test]
    fn test_closed_input_is_exhausted() {
        let (reader, writer) = UnixStream::pair().unwrap();
        let fd = reader.as_raw_fd();
        let mut input = InteractiveInput::new(reader);
        drop(writer);

        assert_eq!(input.next(SHORT), None);
        assert!(input.is_exhausted());
        assert_eq!(input.terminal_fd(), Some(fd));
    }

    #[test]
    fn test_closed_input_still_waits() {
        let (reader, writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);
        drop(writer);
        assert_eq!(input.next(SHORT), None);

        let started = Instant::now();
        assert_eq!(input.next(SHORT), None);
        assert!(started.elapsed() >= SHORT);
    }

    #[test]
    fn test_keys_before_close_are_delivered() {
        let (reader, mut writer) = UnixStream::pair().unwrap();
        let mut input = InteractiveInput::new(reader);
        writer.write_all(b"8q").unwrap();
        drop(writer);

        assert_eq!(input.next(SHORT), Some(Symbol::Move(Direction::Up)));
        assert!(!input.is_exhausted());
        assert_eq!(input.next(SHORT), Some(Symbol::Quit));
        assert_eq!(input.next(SHORT), None);
        assert!(input.is_exhausted());
    }
}
