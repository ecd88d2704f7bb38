//! Byte-stream interface consumed by the descriptor multiplexer.
//!
//! A [`Stream`] is any device or file-like object the C library can talk
//! to: a UART console, a UHI host file, a memory buffer. Every operation
//! is optional; the default methods report [`Error::Unsupported`], which
//! is the typed equivalent of a NULL entry in a C operations table.
//! Implement only what the device can actually do.

use crate::errno::{Error, Result};

/// Origin of a seek operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Whence {
    /// Absolute offset from the start of the stream.
    Set,
    /// Offset relative to the current position.
    Current,
    /// Offset relative to the end of the stream.
    End,
}

impl Whence {
    /// Map a POSIX whence value (0/1/2) to the enum.
    pub fn from_c(whence: i32) -> Result<Self> {
        match whence {
            0 => Ok(Whence::Set),
            1 => Ok(Whence::Current),
            2 => Ok(Whence::End),
            _ => Err(Error::InvalidParameter),
        }
    }
}

/// What a descriptor looks like to `fstat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileKind {
    /// Character device: the console and any stream without a length.
    CharDevice,
    /// Regular file with a known size.
    Regular,
}

/// Minimal stat record reported by the multiplexer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileStat {
    pub kind: FileKind,
    /// Size in bytes; zero for character devices.
    pub size: u32,
}

impl FileStat {
    pub const fn char_device() -> Self {
        FileStat {
            kind: FileKind::CharDevice,
            size: 0,
        }
    }

    pub const fn regular(size: u32) -> Self {
        FileStat {
            kind: FileKind::Regular,
            size,
        }
    }
}

/// A device the descriptor table can bind.
///
/// Methods take `&self`; implementations needing mutable state use interior
/// mutability. The multiplexer serializes access on the single core.
pub trait Stream {
    /// Read into `buf`, returning the number of bytes read (0 means
    /// end-of-stream for finite streams).
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        let _ = buf;
        Err(Error::Unsupported)
    }

    /// Write all of `buf`. The multiplexer forwards each buffer exactly
    /// once; a stream that cannot take the whole buffer fails instead of
    /// reporting a short count.
    fn write(&self, buf: &[u8]) -> Result<()> {
        let _ = buf;
        Err(Error::Unsupported)
    }

    /// Move the stream position.
    fn set_position(&self, offset: i32, whence: Whence) -> Result<()> {
        let _ = (offset, whence);
        Err(Error::Unsupported)
    }

    /// Current absolute position.
    fn position(&self) -> Result<u32> {
        Err(Error::Unsupported)
    }

    /// Total length in bytes, for streams that have one.
    fn length(&self) -> Result<u32> {
        Err(Error::Unsupported)
    }

    /// Called by the multiplexer when the last descriptor for this stream
    /// is closed. Release device resources here.
    fn on_close(&self) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Null;
    impl Stream for Null {}

    #[test]
    fn test_defaults_are_unsupported() {
        let s = Null;
        let mut buf = [0u8; 4];
        assert_eq!(s.read(&mut buf), Err(Error::Unsupported));
        assert_eq!(s.write(b"x"), Err(Error::Unsupported));
        assert_eq!(s.set_position(0, Whence::Set), Err(Error::Unsupported));
        assert_eq!(s.position(), Err(Error::Unsupported));
        assert_eq!(s.length(), Err(Error::Unsupported));
        s.on_close();
    }

    #[test]
    fn test_whence_mapping() {
        assert_eq!(Whence::from_c(0), Ok(Whence::Set));
        assert_eq!(Whence::from_c(1), Ok(Whence::Current));
        assert_eq!(Whence::from_c(2), Ok(Whence::End));
        assert_eq!(Whence::from_c(3), Err(Error::InvalidParameter));
        assert_eq!(Whence::from_c(-1), Err(Error::InvalidParameter));
    }
}
