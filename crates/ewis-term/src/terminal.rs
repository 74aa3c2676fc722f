// SPDX-License-Identifier: MIT
//
// Terminal control — raw mode, window size, and RAII cleanup.
//
// Safety: This module necessarily uses `unsafe` for termios (tcgetattr,
// tcsetattr), ioctl (TIOCGWINSZ), isatty, and raw fd writes. These are
// the standard POSIX interfaces for terminal control; there is no safe
// alternative. Each unsafe block is minimal.
#![allow(unsafe_code)]
//
// Raw mode is the one resource ewis must never leak: a shell left without
// echo or line editing is unusable. Three layers make sure it comes back:
//
//   1. `RawMode` restores the captured attributes in `disable()`, at most
//      once, and calls it again from `Drop` (a no-op if already done).
//   2. Every error path that has drawn to the screen calls
//      `reset_screen()`, which only needs a writer, not editor state.
//   3. A panic hook writes the reset sequence straight to fd 1 and
//      restores termios from a global backup.
//
// The line discipline sits behind the `Discipline` trait so the
// enable/restore pairing can be exercised without a real tty.

use std::io::{self, Write};
#[cfg(unix)]
use std::os::unix::io::RawFd;
use std::sync::Once;
#[cfg(unix)]
use std::sync::Mutex;

use crate::ansi;
use crate::error::TermError;
use crate::geometry::ScreenSize;

// ─── Terminal Queries ───────────────────────────────────────────────────────

/// Query the terminal size via `ioctl(TIOCGWINSZ)` on stdout.
///
/// Returns `None` if stdout is not a terminal, the query fails, or the
/// terminal reports zero rows or columns.
#[cfg(unix)]
#[must_use]
pub fn window_size() -> Option<ScreenSize> {
    let mut ws: libc::winsize = unsafe { std::mem::zeroed() };
    let result = unsafe { libc::ioctl(libc::STDOUT_FILENO, libc::TIOCGWINSZ, &raw mut ws) };

    if result == 0 {
        ScreenSize::new(ws.ws_row, ws.ws_col)
    } else {
        None
    }
}

#[cfg(not(unix))]
#[must_use]
pub fn window_size() -> Option<ScreenSize> {
    None
}

/// Check whether stdin is connected to a terminal (TTY).
#[cfg(unix)]
#[must_use]
pub fn is_tty() -> bool {
    unsafe { libc::isatty(libc::STDIN_FILENO) != 0 }
}

#[cfg(not(unix))]
#[must_use]
pub fn is_tty() -> bool {
    false
}

// ─── Unbuffered Standard Streams ────────────────────────────────────────────

/// Stdin without Rust's `BufReader`: each `read()` is one `read(2)`.
///
/// In raw mode a read returns after `VTIME` with zero bytes, which the key
/// decoder treats as "nothing typed yet".
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStdin;

#[cfg(unix)]
impl io::Read for RawStdin {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::read(
                libc::STDIN_FILENO,
                buf.as_mut_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }
}

/// Stdout without Rust's `LineWriter`: each `write()` is one `write(2)`,
/// so a whole frame reaches the terminal at once.
#[cfg(unix)]
#[derive(Debug, Default, Clone, Copy)]
pub struct RawStdout;

#[cfg(unix)]
impl Write for RawStdout {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        let n = unsafe {
            libc::write(
                libc::STDOUT_FILENO,
                buf.as_ptr().cast::<libc::c_void>(),
                buf.len(),
            )
        };
        usize::try_from(n).map_err(|_| io::Error::last_os_error())
    }

    fn flush(&mut self) -> io::Result<()> {
        Ok(())
    }
}

// ─── Screen Reset ───────────────────────────────────────────────────────────

/// Best-effort screen reset: clear, home, show the cursor.
///
/// Leaves the shell prompt at the top of a clean screen after ewis exits.
const SCREEN_RESET: &[u8] = b"\x1b[2J\x1b[H\x1b[?25h";

/// Clear the screen and home the cursor, ignoring write errors.
///
/// Used on the fatal-error path, where the editor's state may not be
/// valid anymore; all it needs is somewhere to write.
pub fn reset_screen(w: &mut impl Write) {
    let _ = ansi::clear_screen(w)
        .and_then(|()| ansi::cursor_home(w))
        .and_then(|()| ansi::cursor_show(w))
        .and_then(|()| w.flush());
}

// ─── Panic-Safe Terminal Restore ────────────────────────────────────────────

/// Global backup of the original termios for panic recovery.
///
/// [`RawMode`] owns its own snapshot, but the panic hook can't reach it.
/// This backup, behind a [`Mutex`] rather than `static mut`, lets the
/// hook restore cooked mode without the struct.
#[cfg(unix)]
static TERMIOS_BACKUP: Mutex<Option<libc::termios>> = Mutex::new(None);

/// Restore termios from the global backup. Best-effort, ignores errors.
#[cfg(unix)]
fn restore_termios_from_backup() {
    if let Ok(guard) = TERMIOS_BACKUP.lock() {
        if let Some(ref original) = *guard {
            unsafe {
                let _ = libc::tcsetattr(libc::STDIN_FILENO, libc::TCSAFLUSH, original);
            }
        }
    }
}

/// Panic hook guard: the hook is installed at most once per process.
static PANIC_HOOK_INSTALLED: Once = Once::new();

/// Install a panic hook that restores the terminal before printing the error.
///
/// The hook writes [`SCREEN_RESET`] directly to fd 1 (bypassing Rust's
/// stdout lock, which the panicking frame may hold), restores termios,
/// then delegates to the original panic handler.
fn install_panic_hook() {
    PANIC_HOOK_INSTALLED.call_once(|| {
        let original = std::panic::take_hook();
        std::panic::set_hook(Box::new(move |info| {
            emergency_reset();

            #[cfg(unix)]
            restore_termios_from_backup();

            original(info);
        }));
    });
}

/// Write the reset sequence directly to stdout's file descriptor.
fn emergency_reset() {
    #[cfg(unix)]
    unsafe {
        let _ = libc::write(
            libc::STDOUT_FILENO,
            SCREEN_RESET.as_ptr().cast::<libc::c_void>(),
            SCREEN_RESET.len(),
        );
    }

    #[cfg(not(unix))]
    {
        let _ = io::stdout().write_all(SCREEN_RESET);
        let _ = io::stdout().flush();
    }
}

// ─── Line Discipline ────────────────────────────────────────────────────────

/// Access to a terminal's line discipline settings.
///
/// [`Termios`] is the real implementation. Tests substitute a recorder.
pub trait Discipline {
    /// A saved copy of the settings.
    type Snapshot;

    /// Read the current settings.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalAttribute`] if the settings can't be read.
    fn capture(&mut self) -> Result<Self::Snapshot, TermError>;

    /// Switch to raw mode, derived from the captured `original`.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalAttribute`] if the settings can't be applied.
    fn enter_raw(&mut self, original: &Self::Snapshot) -> Result<(), TermError>;

    /// Put `original` back exactly as captured.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalAttribute`] if the settings can't be applied.
    fn restore(&mut self, original: &Self::Snapshot) -> Result<(), TermError>;
}

/// Opaque copy of a terminal's termios settings.
#[cfg(unix)]
#[derive(Clone, Copy)]
pub struct TerminalSnapshot(libc::termios);

#[cfg(unix)]
impl std::fmt::Debug for TerminalSnapshot {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TerminalSnapshot").finish_non_exhaustive()
    }
}

/// Raw-mode settings derived from `original`.
///
/// - input: no break interrupt, no CR→NL, no parity check, no stripping,
///   no XON/XOFF
/// - output: no post-processing (`\n` is not turned into `\r\n`)
/// - control: 8-bit characters
/// - local: no echo, no canonical mode, no `Ctrl-V`, no signal keys
/// - `VMIN = 0`, `VTIME = 1`: a read returns what's available, or nothing
///   after 100 ms
#[cfg(unix)]
#[must_use]
pub fn raw_attributes(original: &libc::termios) -> libc::termios {
    let mut raw = *original;
    raw.c_iflag &= !(libc::BRKINT | libc::ICRNL | libc::INPCK | libc::ISTRIP | libc::IXON);
    raw.c_oflag &= !libc::OPOST;
    raw.c_cflag &= !libc::CSIZE;
    raw.c_cflag |= libc::CS8;
    raw.c_lflag &= !(libc::ECHO | libc::ICANON | libc::IEXTEN | libc::ISIG);
    raw.c_cc[libc::VMIN] = 0;
    raw.c_cc[libc::VTIME] = 1;
    raw
}

/// The termios line discipline of a file descriptor (stdin by default).
#[cfg(unix)]
#[derive(Debug, Clone, Copy)]
pub struct Termios {
    fd: RawFd,
}

#[cfg(unix)]
impl Termios {
    /// The line discipline of stdin.
    #[must_use]
    pub const fn stdin() -> Self {
        Self {
            fd: libc::STDIN_FILENO,
        }
    }

    fn set(&self, attrs: &libc::termios) -> Result<(), TermError> {
        if unsafe { libc::tcsetattr(self.fd, libc::TCSAFLUSH, attrs) } != 0 {
            return Err(TermError::TerminalAttribute {
                call: "tcsetattr",
                source: io::Error::last_os_error(),
            });
        }
        Ok(())
    }
}

#[cfg(unix)]
impl Discipline for Termios {
    type Snapshot = TerminalSnapshot;

    fn capture(&mut self) -> Result<TerminalSnapshot, TermError> {
        let mut termios: libc::termios = unsafe { std::mem::zeroed() };
        if unsafe { libc::tcgetattr(self.fd, &raw mut termios) } != 0 {
            return Err(TermError::TerminalAttribute {
                call: "tcgetattr",
                source: io::Error::last_os_error(),
            });
        }
        Ok(TerminalSnapshot(termios))
    }

    fn enter_raw(&mut self, original: &TerminalSnapshot) -> Result<(), TermError> {
        install_panic_hook();
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = Some(original.0);
        }
        self.set(&raw_attributes(&original.0))
    }

    fn restore(&mut self, original: &TerminalSnapshot) -> Result<(), TermError> {
        self.set(&original.0)?;
        // Nothing left for the panic hook to do.
        if let Ok(mut guard) = TERMIOS_BACKUP.lock() {
            *guard = None;
        }
        Ok(())
    }
}

// ─── RawMode ────────────────────────────────────────────────────────────────

/// Raw mode held for as long as this value lives.
///
/// [`enable`](Self::enable) captures the current settings and switches to
/// raw mode. [`disable`](Self::disable) puts the captured settings back;
/// it runs at most once, and `Drop` calls it for any path that didn't.
///
/// # Example
///
/// ```no_run
/// use ewis_term::terminal::{RawMode, Termios};
///
/// let mut raw = RawMode::enable(Termios::stdin())?;
/// // ... read keys, draw frames ...
/// raw.disable()?;
/// # Ok::<(), ewis_term::TermError>(())
/// ```
pub struct RawMode<D: Discipline> {
    discipline: D,
    /// `Some` while raw mode is active.
    original: Option<D::Snapshot>,
}

impl<D: Discipline> RawMode<D> {
    /// Capture the current settings and enter raw mode.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalAttribute`] if the settings can't be
    /// read or changed. Nothing needs restoring in that case.
    pub fn enable(mut discipline: D) -> Result<Self, TermError> {
        let original = discipline.capture()?;
        discipline.enter_raw(&original)?;
        tracing::debug!("raw mode enabled");
        Ok(Self {
            discipline,
            original: Some(original),
        })
    }

    /// Whether raw mode is still active.
    #[inline]
    #[must_use]
    pub const fn is_active(&self) -> bool {
        self.original.is_some()
    }

    /// The settings captured by [`enable`](Self::enable), while active.
    #[must_use]
    pub const fn snapshot(&self) -> Option<&D::Snapshot> {
        self.original.as_ref()
    }

    /// The wrapped discipline.
    #[must_use]
    pub const fn discipline(&self) -> &D {
        &self.discipline
    }

    /// Restore the captured settings. A no-op once already restored.
    ///
    /// # Errors
    ///
    /// Returns [`TermError::TerminalAttribute`] if `tcsetattr` fails. The
    /// snapshot is consumed either way; there is no second attempt.
    pub fn disable(&mut self) -> Result<(), TermError> {
        if let Some(original) = self.original.take() {
            self.discipline.restore(&original)?;
            tracing::debug!("raw mode disabled");
        }
        Ok(())
    }
}

impl<D: Discipline> Drop for RawMode<D> {
    fn drop(&mut self) {
        let _ = self.disable();
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
