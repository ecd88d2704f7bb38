//! Error taxonomy and the C-side `errno` cell.
//!
//! Every fallible operation in this crate reports one of the [`Error`]
//! variants. The C library entry points translate them into newlib errno
//! values through [`Error::errno`] and store the result in a single static
//! cell that newlib reaches via `__errno()`.

use core::cell::UnsafeCell;
use core::ffi::c_int;
use core::fmt;

/// Operation result used throughout this crate.
pub type Result<T> = core::result::Result<T, Error>;

/// Canonical error codes of the runtime glue.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Error {
    /// An argument was out of range or otherwise malformed (EINVAL).
    InvalidParameter,
    /// The descriptor table has no free slot (EMFILE).
    NoCapacity,
    /// The descriptor is not bound to a stream (EBADF).
    BadDescriptor,
    /// The stream does not implement the requested operation (ENOSYS;
    /// `_lseek` reports it as ESPIPE).
    Unsupported,
    /// The underlying stream operation failed (EIO).
    Io,
    /// The heap region is exhausted (ENOMEM).
    OutOfMemory,
    /// No data available right now; retry later (EAGAIN).
    WouldBlock,
}

impl Error {
    /// The newlib errno value for this error.
    pub fn errno(self) -> c_int {
        match self {
            Error::InvalidParameter => EINVAL,
            Error::NoCapacity => EMFILE,
            Error::BadDescriptor => EBADF,
            Error::Unsupported => ENOSYS,
            Error::Io => EIO,
            Error::OutOfMemory => ENOMEM,
            Error::WouldBlock => EAGAIN,
        }
    }

    /// Human-readable description.
    pub fn as_str(self) -> &'static str {
        match self {
            Error::InvalidParameter => "invalid parameter",
            Error::NoCapacity => "descriptor table full",
            Error::BadDescriptor => "bad descriptor",
            Error::Unsupported => "operation not supported",
            Error::Io => "input/output error",
            Error::OutOfMemory => "out of memory",
            Error::WouldBlock => "resource temporarily unavailable",
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ============ newlib errno values ============

// The numbering follows newlib's errno.h; the UHI debug agent reports host
// failures with the same values.

pub const EPERM: c_int = 1;
pub const ENOENT: c_int = 2;
pub const EINTR: c_int = 4;
pub const EIO: c_int = 5;
pub const ENXIO: c_int = 6;
pub const EBADF: c_int = 9;
pub const ECHILD: c_int = 10;
pub const EAGAIN: c_int = 11;
pub const ENOMEM: c_int = 12;
pub const EACCES: c_int = 13;
pub const EBUSY: c_int = 16;
pub const EEXIST: c_int = 17;
pub const EXDEV: c_int = 18;
pub const ENOTDIR: c_int = 20;
pub const EISDIR: c_int = 21;
pub const EINVAL: c_int = 22;
pub const ENFILE: c_int = 23;
pub const EMFILE: c_int = 24;
pub const ETXTBSY: c_int = 26;
pub const EFBIG: c_int = 27;
pub const ENOSPC: c_int = 28;
pub const ESPIPE: c_int = 29;
pub const EROFS: c_int = 30;
pub const EMLINK: c_int = 31;
pub const EPIPE: c_int = 32;
pub const ERANGE: c_int = 34;
pub const ENOSR: c_int = 63;
pub const EBADMSG: c_int = 77;
pub const ENOSYS: c_int = 88;
pub const ENAMETOOLONG: c_int = 91;
pub const ELOOP: c_int = 92;
pub const ECONNRESET: c_int = 104;
pub const ENOBUFS: c_int = 105;
pub const ENETUNREACH: c_int = 114;
pub const ENETDOWN: c_int = 115;
pub const ETIMEDOUT: c_int = 116;
pub const ENOTCONN: c_int = 128;
pub const EOVERFLOW: c_int = 139;

// ============ errno storage ============

struct ErrnoCell(UnsafeCell<c_int>);

// Safety: single-core target, and newlib reaches the cell through the same
// `__errno()` pointer the Rust accessors use. Host-side tests touch it from
// one thread only.
unsafe impl Sync for ErrnoCell {}

static ERRNO: ErrnoCell = ErrnoCell(UnsafeCell::new(0));

/// Store the errno value for `err`.
pub fn set(err: Error) {
    set_raw(err.errno());
}

/// Store a raw errno value.
pub fn set_raw(code: c_int) {
    unsafe { *ERRNO.0.get() = code }
}

/// The current errno value.
pub fn get() -> c_int {
    unsafe { *ERRNO.0.get() }
}

/// newlib hook: address of the errno cell.
#[cfg_attr(all(target_arch = "mips", target_os = "none"), no_mangle)]
pub extern "C" fn __errno() -> *mut c_int {
    ERRNO.0.get()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(Error::InvalidParameter.errno(), EINVAL);
        assert_eq!(Error::NoCapacity.errno(), EMFILE);
        assert_eq!(Error::BadDescriptor.errno(), EBADF);
        assert_eq!(Error::Unsupported.errno(), ENOSYS);
        assert_eq!(Error::Io.errno(), EIO);
        assert_eq!(Error::OutOfMemory.errno(), ENOMEM);
        assert_eq!(Error::WouldBlock.errno(), EAGAIN);
    }

    #[test]
    fn test_set_and_read_back() {
        set(Error::OutOfMemory);
        assert_eq!(get(), ENOMEM);
        set_raw(0);
        assert_eq!(get(), 0);
        assert_eq!(unsafe { *__errno() }, 0);
    }

    #[test]
    fn test_display() {
        assert_eq!(Error::BadDescriptor.to_string(), "bad descriptor");
    }
}
