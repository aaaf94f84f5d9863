//! Output serialization. A single lock guards every write to a stream's
//! `.out` file so a `SHOW`'s grid (or a `LIST`'s event roll call) is
//! emitted as one contiguous block, never interleaved with another
//! thread's render.

use std::io;
use std::io::Write;
use std::sync::Mutex;
use std::sync::MutexGuard;

use ems_common::logging::abort_on_poison;

/// Wraps any [`Write`] sink behind a single serialization lock.
pub struct OutputWriter<W> {
    inner: Mutex<W>,
}

impl<W: Write> OutputWriter<W> {
    pub fn new(inner: W) -> Self {
        Self {
            inner: Mutex::new(inner),
        }
    }

    /// Acquires the writer lock for the duration of a render. Held across
    /// an entire `SHOW` grid or `LIST` roll call so no other thread's
    /// output can interleave inside it.
    pub fn lock(&self) -> MutexGuard<'_, W> {
        self.inner
            .lock()
            .unwrap_or_else(|_| abort_on_poison("write lock"))
    }
}

/// Writes `buf` in full, looping over partial writes until every byte has
/// been flushed. A write that reports zero bytes written is treated as a
/// failure rather than looped on forever.
pub fn write_all_buffered<W: Write>(w: &mut W, buf: &[u8]) -> io::Result<()> {
    let mut done = 0;
    while done < buf.len() {
        let n = w.write(&buf[done..])?;
        if n == 0 {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "failed to write whole buffer",
            ));
        }
        done += n;
    }
    Ok(())
}
