//! UHI semihosting over the debug probe.
//!
//! Each request loads an operation number into `$25`, arguments into
//! `$4`..`$6`, and executes `sdbbp 1`. The probe services the request and
//! resumes the core with a primary result in `$2` and either an error
//! code or a transfer count in `$3`. Without a probe attached the
//! breakpoint escalates to the debug exception, so these calls are only
//! useful on debug builds.
//!
//! [`HostConsole`] and [`HostFile`] wrap the raw operations as
//! [`Stream`]s that can be bound into the file descriptor table.

use core::fmt;

#[cfg(all(target_arch = "mips", target_os = "none"))]
use core::ffi::CStr;

use crate::stream::FileStat;

#[cfg(all(target_arch = "mips", target_os = "none"))]
use crate::errno::{Error, Result};
#[cfg(all(target_arch = "mips", target_os = "none"))]
use crate::stream::{Stream, Whence};

// ================ Operation numbers ================

/// UHI operation numbers.
pub mod ops {
    pub const EXIT: u32 = 1;
    pub const OPEN: u32 = 2;
    pub const CLOSE: u32 = 3;
    pub const READ: u32 = 4;
    pub const WRITE: u32 = 5;
    pub const LSEEK: u32 = 6;
    pub const UNLINK: u32 = 7;
    pub const FSTAT: u32 = 8;
    pub const ARGC: u32 = 9;
    pub const ARGLEN: u32 = 10;
    pub const ARGN: u32 = 11;
    pub const RAMRANGE: u32 = 12;
    pub const LOG: u32 = 13;
    pub const ASSERT: u32 = 14;
    pub const EXCEPTION: u32 = 15;
    pub const PREAD: u32 = 19;
    pub const PWRITE: u32 = 20;
    pub const BOOT_FAIL: u32 = 23;
}

/// Host `open` flags, newlib numbering passed through unchanged.
pub const O_RDONLY: u32 = 0x0;
pub const O_WRONLY: u32 = 0x1;
pub const O_RDWR: u32 = 0x2;
pub const O_APPEND: u32 = 0x8;
pub const O_CREAT: u32 = 0x200;
pub const O_TRUNC: u32 = 0x400;
pub const O_EXCL: u32 = 0x800;

/// Host file descriptor the console reads from.
#[cfg(all(target_arch = "mips", target_os = "none"))]
const HOST_STDIN: i32 = 0;
/// Host file descriptor the console writes to.
#[cfg(all(target_arch = "mips", target_os = "none"))]
const HOST_STDOUT: i32 = 1;

// ================ Raw call ================

#[cfg(all(target_arch = "mips", target_os = "none"))]
core::arch::global_asm!(
    r#"
    .section .text.__uhi_raw, "ax"
    .set push
    .set noreorder
    .global __uhi_raw
    .type __uhi_raw, @function
__uhi_raw:
    move    $25, $7
    sdbbp   1
    jr      $31
    nop
    .set pop
    .size __uhi_raw, . - __uhi_raw
"#
);

#[cfg(all(target_arch = "mips", target_os = "none"))]
extern "C" {
    // Returns $2 in the low word and $3 in the high word.
    fn __uhi_raw(a0: u32, a1: u32, a2: u32, op: u32) -> u64;
}

/// Primary result and the secondary `$3` value of one request.
#[cfg(all(target_arch = "mips", target_os = "none"))]
fn uhi_call(op: u32, a0: u32, a1: u32, a2: u32) -> (i32, u32) {
    let pair = unsafe { __uhi_raw(a0, a1, a2, op) };
    (pair as u32 as i32, (pair >> 32) as u32)
}

// ================ Errors ================

/// Error code reported by the host in `$3`.
///
/// The host already uses newlib numbering, so the code can be stored
/// into `errno` without translation.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct HostError(pub i32);

impl HostError {
    /// The raw newlib errno value.
    pub const fn errno(self) -> i32 {
        self.0
    }
}

impl fmt::Display for HostError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "host errno {}", self.0)
    }
}

// ================ File metadata ================

/// File metadata as the host lays it out for the `fstat` operation.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct UhiStat {
    pub dev: i16,
    pub ino: u16,
    pub mode: u32,
    pub nlink: u16,
    pub uid: u16,
    pub gid: u16,
    pub rdev: i16,
    pub size: u64,
    pub atime: u64,
    pub spare1: u64,
    pub mtime: u64,
    pub spare2: u64,
    pub ctime: u64,
    pub spare3: u64,
    pub blksize: u64,
    pub blocks: u64,
    pub spare4: [u64; 2],
}

impl UhiStat {
    /// Collapse the host record into the multiplexer's stat shape.
    pub fn file_stat(&self) -> FileStat {
        const S_IFMT: u32 = 0xF000;
        const S_IFCHR: u32 = 0x2000;
        if self.mode & S_IFMT == S_IFCHR {
            FileStat::char_device()
        } else {
            FileStat::regular(self.size as u32)
        }
    }
}

// ================ Typed operations ================

#[cfg(all(target_arch = "mips", target_os = "none"))]
type HostResult<T> = core::result::Result<T, HostError>;

/// Opens a file on the host. Returns the host file descriptor.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn open(path: &CStr, flags: u32, mode: u32) -> HostResult<i32> {
    let (ret, aux) = uhi_call(ops::OPEN, path.as_ptr() as u32, flags, mode);
    if ret < 0 {
        Err(HostError(aux as i32))
    } else {
        Ok(ret)
    }
}

/// Closes a host file descriptor.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn close(fd: i32) -> HostResult<()> {
    let (ret, aux) = uhi_call(ops::CLOSE, fd as u32, 0, 0);
    if ret < 0 {
        Err(HostError(aux as i32))
    } else {
        Ok(())
    }
}

/// Reads from a host file descriptor. A single request, no retry; the
/// host may legitimately return fewer bytes than asked for.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn read(fd: i32, buf: &mut [u8]) -> HostResult<usize> {
    let (ret, aux) = uhi_call(ops::READ, fd as u32, buf.as_mut_ptr() as u32, buf.len() as u32);
    if ret < 0 {
        Err(HostError(aux as i32))
    } else {
        Ok(ret as usize)
    }
}

/// Writes to a host file descriptor. Returns the byte count, which the
/// host reports in `$3` for this operation.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn write(fd: i32, buf: &[u8]) -> HostResult<usize> {
    let (ret, aux) = uhi_call(ops::WRITE, fd as u32, buf.as_ptr() as u32, buf.len() as u32);
    if ret < 0 {
        Err(HostError(aux as i32))
    } else {
        Ok(aux as usize)
    }
}

/// Moves the host-side file offset. Returns the new offset.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn lseek(fd: i32, offset: i32, whence: Whence) -> HostResult<u32> {
    let w = match whence {
        Whence::Set => 0,
        Whence::Current => 1,
        Whence::End => 2,
    };
    let (ret, aux) = uhi_call(ops::LSEEK, fd as u32, offset as u32, w);
    if ret == -1 {
        Err(HostError(aux as i32))
    } else {
        Ok(ret as u32)
    }
}

/// Queries metadata of a host file descriptor.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn fstat(fd: i32) -> HostResult<UhiStat> {
    let mut st = UhiStat::default();
    let (ret, aux) = uhi_call(ops::FSTAT, fd as u32, &mut st as *mut UhiStat as u32, 0);
    if ret < 0 {
        Err(HostError(aux as i32))
    } else {
        Ok(st)
    }
}

/// Removes a file on the host.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn unlink(path: &CStr) -> HostResult<()> {
    let (ret, aux) = uhi_call(ops::UNLINK, path.as_ptr() as u32, 0, 0);
    if ret < 0 {
        Err(HostError(aux as i32))
    } else {
        Ok(())
    }
}

/// Sends a message to the probe log.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn log(msg: &CStr) {
    let _ = uhi_call(ops::LOG, msg.as_ptr() as u32, 0, 0);
}

/// Reports program exit to the host and parks the core.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn exit(code: i32) -> ! {
    let _ = uhi_call(ops::EXIT, code as u32, 0, 0);
    loop {
        continue;
    }
}

// ================ Console stream ================

/// The host console, streamed over UHI file descriptors 0 and 1.
///
/// Reads from a probe return an error while no input is pending. The
/// [`blocking`](HostConsole::blocking) console retries until data
/// arrives; the [`non_blocking`](HostConsole::non_blocking) one reports
/// [`Error::WouldBlock`] instead.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub struct HostConsole {
    retry: bool,
}

#[cfg(all(target_arch = "mips", target_os = "none"))]
impl HostConsole {
    pub const fn blocking() -> Self {
        HostConsole { retry: true }
    }

    pub const fn non_blocking() -> Self {
        HostConsole { retry: false }
    }
}

#[cfg(all(target_arch = "mips", target_os = "none"))]
impl Stream for HostConsole {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        loop {
            match read(HOST_STDIN, buf) {
                Ok(n) => return Ok(n),
                Err(_) if self.retry => continue,
                Err(_) => return Err(Error::WouldBlock),
            }
        }
    }

    fn write(&self, buf: &[u8]) -> Result<()> {
        match write(HOST_STDOUT, buf) {
            Ok(n) if n == buf.len() => Ok(()),
            _ => Err(Error::Io),
        }
    }
}

// ================ File stream ================

/// A file on the host, opened over UHI.
///
/// The host keeps the file offset, so positioning maps straight onto the
/// host `lseek` operation. Closing the stream closes the host
/// descriptor.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub struct HostFile {
    fd: i32,
}

#[cfg(all(target_arch = "mips", target_os = "none"))]
impl HostFile {
    /// Opens an existing file for reading.
    pub fn open(path: &CStr) -> HostResult<Self> {
        Self::with_flags(path, O_RDONLY, 0)
    }

    /// Creates or truncates a file for writing.
    pub fn create(path: &CStr) -> HostResult<Self> {
        Self::with_flags(path, O_WRONLY | O_CREAT | O_TRUNC, 0o666)
    }

    /// Opens with explicit flags and creation mode.
    pub fn with_flags(path: &CStr, flags: u32, mode: u32) -> HostResult<Self> {
        let fd = open(path, flags, mode)?;
        Ok(HostFile { fd })
    }
}

#[cfg(all(target_arch = "mips", target_os = "none"))]
impl Stream for HostFile {
    fn read(&self, buf: &mut [u8]) -> Result<usize> {
        read(self.fd, buf).map_err(|_| Error::Io)
    }

    fn write(&self, buf: &[u8]) -> Result<()> {
        match write(self.fd, buf) {
            Ok(n) if n == buf.len() => Ok(()),
            _ => Err(Error::Io),
        }
    }

    fn set_position(&self, offset: i32, whence: Whence) -> Result<()> {
        lseek(self.fd, offset, whence).map(|_| ()).map_err(|_| Error::Io)
    }

    fn position(&self) -> Result<u32> {
        lseek(self.fd, 0, Whence::Current).map_err(|_| Error::Io)
    }

    fn length(&self) -> Result<u32> {
        let st = fstat(self.fd).map_err(|_| Error::Io)?;
        Ok(st.size as u32)
    }

    fn on_close(&self) {
        let _ = close(self.fd);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::mem::size_of;

    #[test]
    fn test_stat_layout_matches_host() {
        // 16 bytes of short fields, then twelve 8-byte fields.
        assert_eq!(size_of::<UhiStat>(), 112);
    }

    #[test]
    fn test_operation_numbers() {
        assert_eq!(ops::EXIT, 1);
        assert_eq!(ops::WRITE, 5);
        assert_eq!(ops::FSTAT, 8);
        assert_eq!(ops::PWRITE, 20);
        assert_eq!(ops::BOOT_FAIL, 23);
    }

    #[test]
    fn test_host_error_passthrough() {
        let err = HostError(2);
        assert_eq!(err.errno(), 2);
        assert_eq!(err.to_string(), "host errno 2");
    }

    #[test]
    fn test_stat_conversion() {
        let mut st = UhiStat::default();
        st.mode = 0x2190; // character device
        assert_eq!(st.file_stat(), FileStat::char_device());

        st.mode = 0x81A4; // regular file
        st.size = 4096;
        assert_eq!(st.file_stat(), FileStat::regular(4096));
    }
}
