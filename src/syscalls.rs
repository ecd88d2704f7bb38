//! newlib system call glue.
//!
//! The C library reduces all of its I/O to a small set of `_`-prefixed
//! system calls. This module backs them with a fixed-size table that
//! maps file descriptors to [`Stream`]s and a bump allocator over the
//! linker-defined heap region, so `printf` and `malloc` work once a
//! console stream has been bound with [`init`].
//!
//! Descriptors 0..=2 are the standard streams and always refer to the
//! console; descriptors 3.. are handed out by [`alloc_fd`]. The table
//! holds plain references, so a bound stream must outlive its binding;
//! closing a descriptor drops the table's reference and gives the
//! stream a chance to finalize itself.
//!
//! Everything here runs from foreground context. Descriptor lookups
//! and table updates take a critical section; reads, seeks and close
//! hooks run the stream operation after it is released, with the
//! caller's interrupt state, so a console read that waits on the host
//! does not hold interrupts off. Writes and stats complete inside the
//! critical section, which keeps a panic message printed from
//! interrupt context from interleaving with foreground output; a
//! stream's `write` and `length` must therefore not call back into
//! this module.

use crate::errno::{Error, Result};
use crate::stream::{FileStat, Stream, Whence};

#[cfg(all(target_arch = "mips", target_os = "none"))]
use crate::errno;
#[cfg(all(target_arch = "mips", target_os = "none"))]
use crate::sync::SingleCoreCell;
#[cfg(all(target_arch = "mips", target_os = "none"))]
use core::ffi::{c_char, c_int};

/// Size of the file descriptor table.
pub const MAX_FDS: usize = 16;
/// First descriptor handed out by allocation; 0..=2 are the standard
/// streams.
const FIRST_ALLOC_FD: usize = 3;

// ================ File descriptor table ================

/// Fixed-capacity map from file descriptors to streams.
pub struct FdTable<'a> {
    slots: [Option<&'a dyn Stream>; MAX_FDS],
}

impl<'a> FdTable<'a> {
    /// An empty table; every operation fails until streams are bound.
    pub const fn new() -> Self {
        FdTable {
            slots: [None; MAX_FDS],
        }
    }

    /// Binds descriptors 0, 1 and 2 to `console`. Rebinding is a plain
    /// reassignment and never fails.
    pub fn bind_console(&mut self, console: &'a dyn Stream) {
        self.slots[0] = Some(console);
        self.slots[1] = Some(console);
        self.slots[2] = Some(console);
    }

    /// Rebinds an in-range descriptor, or unbinds it with `None`.
    pub fn set(&mut self, fd: i32, stream: Option<&'a dyn Stream>) -> Result<()> {
        let idx = usize::try_from(fd).map_err(|_| Error::InvalidParameter)?;
        let slot = self.slots.get_mut(idx).ok_or(Error::InvalidParameter)?;
        *slot = stream;
        Ok(())
    }

    /// Binds `stream` to the first free descriptor at or above 3.
    pub fn alloc(&mut self, stream: &'a dyn Stream) -> Result<i32> {
        for (fd, slot) in self.slots.iter_mut().enumerate().skip(FIRST_ALLOC_FD) {
            if slot.is_none() {
                *slot = Some(stream);
                return Ok(fd as i32);
            }
        }
        Err(Error::NoCapacity)
    }

    fn get(&self, fd: i32) -> Result<&'a dyn Stream> {
        let idx = usize::try_from(fd).map_err(|_| Error::InvalidParameter)?;
        match self.slots.get(idx) {
            None => Err(Error::InvalidParameter),
            Some(None) => Err(Error::BadDescriptor),
            Some(Some(stream)) => Ok(*stream),
        }
    }

    /// Writes the whole buffer to the bound stream and returns its
    /// length.
    pub fn write(&self, fd: i32, buf: &[u8]) -> Result<usize> {
        let stream = self.get(fd)?;
        stream.write(buf)?;
        Ok(buf.len())
    }

    /// Reads from the bound stream; may return fewer bytes than asked
    /// for.
    pub fn read(&self, fd: i32, buf: &mut [u8]) -> Result<usize> {
        self.get(fd)?.read(buf)
    }

    /// Repositions the bound stream and returns the new absolute
    /// position.
    pub fn seek(&self, fd: i32, offset: i32, whence: Whence) -> Result<u32> {
        seek_stream(self.get(fd)?, offset, whence)
    }

    /// Unbinds a descriptor and hands back its stream so the caller can
    /// run the close hook. The standard descriptors are never released;
    /// taking them yields no stream.
    pub fn take(&mut self, fd: i32) -> Result<Option<&'a dyn Stream>> {
        let idx = usize::try_from(fd).map_err(|_| Error::InvalidParameter)?;
        if idx >= MAX_FDS {
            return Err(Error::InvalidParameter);
        }
        if idx < FIRST_ALLOC_FD {
            return Ok(None);
        }
        match self.slots[idx].take() {
            Some(stream) => Ok(Some(stream)),
            None => Err(Error::BadDescriptor),
        }
    }

    /// Releases a descriptor. The standard descriptors are never
    /// released; closing them succeeds without touching the console.
    pub fn close(&mut self, fd: i32) -> Result<()> {
        if let Some(stream) = self.take(fd)? {
            stream.on_close();
        }
        Ok(())
    }

    /// Shape of the file behind a descriptor. Streams that report a
    /// length look like regular files; everything else, including the
    /// standard descriptors, looks like a character device.
    pub fn stat(&self, fd: i32) -> Result<FileStat> {
        let idx = usize::try_from(fd).map_err(|_| Error::InvalidParameter)?;
        if idx >= MAX_FDS {
            return Err(Error::InvalidParameter);
        }
        if idx < FIRST_ALLOC_FD {
            return Ok(FileStat::char_device());
        }
        let stream = self.get(fd)?;
        match stream.length() {
            Ok(len) => Ok(FileStat::regular(len)),
            Err(_) => Ok(FileStat::char_device()),
        }
    }

    /// Only the standard descriptors are terminals.
    pub fn is_tty(&self, fd: i32) -> bool {
        isatty_check(fd).is_ok()
    }
}

impl<'a> Default for FdTable<'a> {
    fn default() -> Self {
        Self::new()
    }
}

/// Repositions a stream and reports the new absolute position.
fn seek_stream(stream: &dyn Stream, offset: i32, whence: Whence) -> Result<u32> {
    stream.set_position(offset, whence)?;
    stream.position()
}

/// Answer behind `_isatty` and [`FdTable::is_tty`]: the standard
/// descriptors are terminals; every other descriptor is
/// `BadDescriptor`, bound or not.
fn isatty_check(fd: i32) -> Result<()> {
    if (0..FIRST_ALLOC_FD as i32).contains(&fd) {
        Ok(())
    } else {
        Err(Error::BadDescriptor)
    }
}

// ================ Heap ================

/// Bump allocator over `[start, end)`, the contract `malloc` expects
/// from `sbrk`.
#[derive(Clone, Copy, Debug)]
pub struct Heap {
    start: usize,
    end: usize,
    brk: usize,
}

impl Heap {
    pub const fn new(start: usize, end: usize) -> Self {
        Heap {
            start,
            end,
            brk: start,
        }
    }

    /// Moves the break by `incr` bytes and returns its previous value.
    /// The break stays unchanged when the move would leave the region.
    pub fn grow(&mut self, incr: isize) -> Result<usize> {
        let prev = self.brk;
        let next = self
            .brk
            .checked_add_signed(incr)
            .ok_or(Error::OutOfMemory)?;
        if next < self.start || next > self.end {
            return Err(Error::OutOfMemory);
        }
        self.brk = next;
        Ok(prev)
    }

    /// Bytes handed out so far.
    pub fn used(&self) -> usize {
        self.brk - self.start
    }

    /// Bytes left before the region is exhausted.
    pub fn free(&self) -> usize {
        self.end - self.brk
    }
}

// ================ newlib types ================

/// `struct stat` as newlib lays it out, 32-bit time fields.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Stat {
    pub dev: i16,
    pub ino: u16,
    pub mode: u32,
    pub nlink: u16,
    pub uid: u16,
    pub gid: u16,
    pub rdev: i16,
    pub size: i32,
    pub atime: i32,
    pub spare1: i32,
    pub mtime: i32,
    pub spare2: i32,
    pub ctime: i32,
    pub spare3: i32,
    pub blksize: i32,
    pub blocks: i32,
    pub spare4: [i32; 2],
}

/// `st_mode` bit for character devices.
pub const S_IFCHR: u32 = 0x2000;
/// `st_mode` bit for regular files.
pub const S_IFREG: u32 = 0x8000;

/// `struct tms` as newlib lays it out.
#[repr(C)]
#[derive(Clone, Copy, Debug, Default)]
pub struct Tms {
    pub utime: i32,
    pub stime: i32,
    pub cutime: i32,
    pub cstime: i32,
}

// ================ Global state ================

#[cfg(all(target_arch = "mips", target_os = "none"))]
struct Glue {
    fds: FdTable<'static>,
    heap: Option<Heap>,
}

#[cfg(all(target_arch = "mips", target_os = "none"))]
static GLUE: SingleCoreCell<Glue> = SingleCoreCell::new(Glue {
    fds: FdTable::new(),
    heap: None,
});

/// The heap region the linker script reserved between `.bss` and the
/// stack.
#[cfg(all(target_arch = "mips", target_os = "none"))]
fn heap_region() -> (usize, usize) {
    extern "C" {
        static mut _heap_start: u8;
        static mut _heap_end: u8;
    }
    unsafe {
        (
            core::ptr::addr_of_mut!(_heap_start) as usize,
            core::ptr::addr_of_mut!(_heap_end) as usize,
        )
    }
}

/// Binds the standard descriptors to `console` and readies the heap.
///
/// Call this before the first `printf` or `malloc`. Calling it again
/// rebinds the standard descriptors; descriptors 3.. and the heap break
/// are left alone.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn init(console: &'static dyn Stream) {
    GLUE.with(|glue| {
        glue.fds.bind_console(console);
        glue.heap.get_or_insert_with(|| {
            let (start, end) = heap_region();
            Heap::new(start, end)
        });
    });
}

/// Rebinds a descriptor, or unbinds it with `None`.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn set_fd(fd: i32, stream: Option<&'static dyn Stream>) -> Result<()> {
    GLUE.with(|glue| glue.fds.set(fd, stream))
}

/// Binds `stream` to a free descriptor and returns it.
#[cfg(all(target_arch = "mips", target_os = "none"))]
pub fn alloc_fd(stream: &'static dyn Stream) -> Result<i32> {
    GLUE.with(|glue| glue.fds.alloc(stream))
}

// ================ newlib entry points ================

#[cfg(all(target_arch = "mips", target_os = "none"))]
mod shims {
    use super::*;
    use crate::stream::FileKind;

    fn fail(err: Error) -> c_int {
        errno::set(err);
        -1
    }

    fn fail_raw(code: c_int) -> c_int {
        errno::set_raw(code);
        -1
    }

    #[no_mangle]
    pub extern "C" fn _write(fd: c_int, buf: *const u8, count: c_int) -> c_int {
        if buf.is_null() || count < 0 {
            return fail(Error::InvalidParameter);
        }
        let bytes = unsafe { core::slice::from_raw_parts(buf, count as usize) };
        match GLUE.with(|glue| glue.fds.write(fd, bytes)) {
            Ok(n) => n as c_int,
            Err(err) => fail(err),
        }
    }

    #[no_mangle]
    pub extern "C" fn _read(fd: c_int, buf: *mut u8, count: c_int) -> c_int {
        if buf.is_null() || count < 0 {
            return fail(Error::InvalidParameter);
        }
        let bytes = unsafe { core::slice::from_raw_parts_mut(buf, count as usize) };
        // Resolve under the lock, read outside it. A console read may
        // wait on the host for bytes; that wait must not run with
        // interrupts masked.
        let stream = GLUE.with(|glue| glue.fds.get(fd));
        match stream.and_then(|s| s.read(bytes)) {
            Ok(n) => n as c_int,
            Err(err) => fail(err),
        }
    }

    #[no_mangle]
    pub extern "C" fn _open(_path: *const c_char, _flags: c_int, _mode: c_int) -> c_int {
        // No filesystem; host files go through semihost::HostFile and
        // alloc_fd instead.
        fail_raw(errno::ENOENT)
    }

    #[no_mangle]
    pub extern "C" fn _close(fd: c_int) -> c_int {
        match GLUE.with(|glue| glue.fds.take(fd)) {
            Ok(stream) => {
                // The close hook may do host IO; run it after the lock
                // is gone.
                if let Some(stream) = stream {
                    stream.on_close();
                }
                0
            }
            Err(err) => fail(err),
        }
    }

    #[no_mangle]
    pub extern "C" fn _lseek(fd: c_int, offset: c_int, whence: c_int) -> c_int {
        let whence = match Whence::from_c(whence) {
            Ok(w) => w,
            Err(err) => return fail(err),
        };
        let stream = GLUE.with(|glue| glue.fds.get(fd));
        match stream.and_then(|s| seek_stream(s, offset, whence)) {
            Ok(pos) => pos as c_int,
            // A stream without position operations cannot seek.
            Err(Error::Unsupported) => fail_raw(errno::ESPIPE),
            Err(err) => fail(err),
        }
    }

    #[no_mangle]
    pub extern "C" fn _fstat(fd: c_int, st: *mut Stat) -> c_int {
        if st.is_null() {
            return fail(Error::InvalidParameter);
        }
        match GLUE.with(|glue| glue.fds.stat(fd)) {
            Ok(info) => {
                let st = unsafe { &mut *st };
                *st = Stat::default();
                match info.kind {
                    FileKind::CharDevice => st.mode = S_IFCHR,
                    FileKind::Regular => {
                        st.mode = S_IFREG;
                        st.size = info.size as i32;
                    }
                }
                0
            }
            Err(err) => fail(err),
        }
    }

    #[no_mangle]
    pub extern "C" fn _isatty(fd: c_int) -> c_int {
        match isatty_check(fd) {
            Ok(()) => 1,
            // The 0 return is an answer, not a failure; errno alone
            // reports the EBADF.
            Err(err) => {
                errno::set(err);
                0
            }
        }
    }

    #[no_mangle]
    pub extern "C" fn _sbrk(incr: isize) -> *mut u8 {
        let grown = GLUE.with(|glue| {
            let heap = glue.heap.get_or_insert_with(|| {
                let (start, end) = heap_region();
                Heap::new(start, end)
            });
            heap.grow(incr)
        });
        match grown {
            Ok(prev) => prev as *mut u8,
            Err(err) => {
                errno::set(err);
                usize::MAX as *mut u8
            }
        }
    }

    #[no_mangle]
    pub extern "C" fn _exit(status: c_int) -> ! {
        crate::interrupt::disable();
        #[cfg(feature = "uhi-exit")]
        crate::semihost::exit(status);
        #[cfg(not(feature = "uhi-exit"))]
        {
            let _ = status;
            loop {
                unsafe { core::arch::asm!("wait") };
            }
        }
    }

    #[no_mangle]
    pub extern "C" fn _kill(_pid: c_int, _sig: c_int) -> c_int {
        fail(Error::InvalidParameter)
    }

    #[no_mangle]
    pub extern "C" fn _getpid() -> c_int {
        1
    }

    #[no_mangle]
    pub extern "C" fn _times(_buf: *mut Tms) -> c_int {
        -1
    }

    #[no_mangle]
    pub extern "C" fn _link(_old: *const c_char, _new: *const c_char) -> c_int {
        fail_raw(errno::EMLINK)
    }

    #[no_mangle]
    pub extern "C" fn _unlink(_path: *const c_char) -> c_int {
        fail_raw(errno::ENOENT)
    }

    #[no_mangle]
    pub extern "C" fn _wait(_status: *mut c_int) -> c_int {
        fail_raw(errno::ECHILD)
    }

    #[no_mangle]
    pub extern "C" fn _fork() -> c_int {
        fail_raw(errno::EAGAIN)
    }

    #[no_mangle]
    pub extern "C" fn _execve(
        _path: *const c_char,
        _argv: *const *const c_char,
        _envp: *const *const c_char,
    ) -> c_int {
        fail(Error::OutOfMemory)
    }

    #[no_mangle]
    pub extern "C" fn _stat(_path: *const c_char, _st: *mut Stat) -> c_int {
        fail_raw(errno::ENOENT)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stream::FileKind;
    use std::cell::{Cell, RefCell};
    use std::vec::Vec;

    /// Seekable in-memory stream.
    struct MemStream {
        data: RefCell<Vec<u8>>,
        pos: Cell<usize>,
        closed: Cell<bool>,
    }

    impl MemStream {
        fn new(data: &[u8]) -> Self {
            MemStream {
                data: RefCell::new(data.to_vec()),
                pos: Cell::new(0),
                closed: Cell::new(false),
            }
        }
    }

    impl Stream for MemStream {
        fn read(&self, buf: &mut [u8]) -> Result<usize> {
            let data = self.data.borrow();
            let pos = self.pos.get();
            let n = buf.len().min(data.len().saturating_sub(pos));
            buf[..n].copy_from_slice(&data[pos..pos + n]);
            self.pos.set(pos + n);
            Ok(n)
        }

        fn write(&self, buf: &[u8]) -> Result<()> {
            let mut data = self.data.borrow_mut();
            let pos = self.pos.get();
            for (i, byte) in buf.iter().enumerate() {
                if pos + i < data.len() {
                    data[pos + i] = *byte;
                } else {
                    data.push(*byte);
                }
            }
            self.pos.set(pos + buf.len());
            Ok(())
        }

        fn set_position(&self, offset: i32, whence: Whence) -> Result<()> {
            let len = self.data.borrow().len() as i32;
            let base = match whence {
                Whence::Set => 0,
                Whence::Current => self.pos.get() as i32,
                Whence::End => len,
            };
            let target = base + offset;
            if target < 0 || target > len {
                return Err(Error::Io);
            }
            self.pos.set(target as usize);
            Ok(())
        }

        fn position(&self) -> Result<u32> {
            Ok(self.pos.get() as u32)
        }

        fn length(&self) -> Result<u32> {
            Ok(self.data.borrow().len() as u32)
        }

        fn on_close(&self) {
            self.closed.set(true);
        }
    }

    /// Console double that counts write calls.
    struct Console {
        writes: Cell<usize>,
        data: RefCell<Vec<u8>>,
    }

    impl Console {
        fn new() -> Self {
            Console {
                writes: Cell::new(0),
                data: RefCell::new(Vec::new()),
            }
        }
    }

    impl Stream for Console {
        fn read(&self, _buf: &mut [u8]) -> Result<usize> {
            Ok(0)
        }

        fn write(&self, buf: &[u8]) -> Result<()> {
            self.writes.set(self.writes.get() + 1);
            self.data.borrow_mut().extend_from_slice(buf);
            Ok(())
        }
    }

    /// Stream that supports nothing; every default applies.
    struct Inert;

    impl Stream for Inert {}

    /// Console with nothing buffered; reads would block.
    struct EmptyConsole;

    impl Stream for EmptyConsole {
        fn read(&self, _buf: &mut [u8]) -> Result<usize> {
            Err(Error::WouldBlock)
        }

        fn write(&self, _buf: &[u8]) -> Result<()> {
            Ok(())
        }
    }

    #[test]
    fn test_console_write_forwarded_once() {
        let console = Console::new();
        let mut fds = FdTable::new();
        fds.bind_console(&console);

        assert_eq!(fds.write(1, b"hi"), Ok(2));
        assert_eq!(console.writes.get(), 1);
        assert_eq!(console.data.borrow().as_slice(), b"hi");
    }

    #[test]
    fn test_allocated_fd_routes_to_stream() {
        let stream = MemStream::new(b"");
        let mut fds = FdTable::new();

        let fd = fds.alloc(&stream).unwrap();
        assert!(fd >= 3);

        assert_eq!(fds.write(fd, b"abc"), Ok(3));
        fds.seek(fd, 0, Whence::Set).unwrap();
        let mut buf = [0u8; 8];
        assert_eq!(fds.read(fd, &mut buf), Ok(3));
        assert_eq!(&buf[..3], b"abc");

        assert_eq!(fds.close(fd), Ok(()));
        assert!(stream.closed.get());
        assert_eq!(fds.write(fd, b"x"), Err(Error::BadDescriptor));
    }

    #[test]
    fn test_alloc_exhaustion_and_reuse() {
        let stream = Inert;
        let mut fds = FdTable::new();

        let mut last = 0;
        for _ in FIRST_ALLOC_FD..MAX_FDS {
            last = fds.alloc(&stream).unwrap();
        }
        assert_eq!(last, MAX_FDS as i32 - 1);
        assert_eq!(fds.alloc(&stream), Err(Error::NoCapacity));

        assert_eq!(fds.close(5), Ok(()));
        assert_eq!(fds.alloc(&stream), Ok(5));
    }

    #[test]
    fn test_out_of_range_and_unbound_descriptors() {
        let mut fds = FdTable::new();
        let mut buf = [0u8; 4];

        for fd in [-1, MAX_FDS as i32, 99] {
            assert_eq!(fds.write(fd, b"x"), Err(Error::InvalidParameter));
            assert_eq!(fds.read(fd, &mut buf), Err(Error::InvalidParameter));
            assert_eq!(fds.seek(fd, 0, Whence::Set), Err(Error::InvalidParameter));
            assert_eq!(fds.close(fd), Err(Error::InvalidParameter));
            assert_eq!(fds.stat(fd).unwrap_err(), Error::InvalidParameter);
            assert_eq!(fds.set(fd, None), Err(Error::InvalidParameter));
        }

        assert_eq!(fds.write(7, b"x"), Err(Error::BadDescriptor));
        assert_eq!(fds.read(7, &mut buf), Err(Error::BadDescriptor));
        assert_eq!(fds.close(7), Err(Error::BadDescriptor));
        assert_eq!(fds.stat(7).unwrap_err(), Error::BadDescriptor);
    }

    #[test]
    fn test_standard_descriptors_survive_close() {
        let console = Console::new();
        let mut fds = FdTable::new();
        fds.bind_console(&console);

        for fd in 0..3 {
            assert_eq!(fds.close(fd), Ok(()));
            assert_eq!(fds.close(fd), Ok(()));
        }
        assert_eq!(fds.write(1, b"still here"), Ok(10));
    }

    #[test]
    fn test_take_unbinds_without_running_the_hook() {
        let stream = MemStream::new(b"");
        let mut fds = FdTable::new();
        let fd = fds.alloc(&stream).unwrap();

        let taken = fds.take(fd).unwrap().unwrap();
        assert!(!stream.closed.get());
        assert_eq!(fds.write(fd, b"x"), Err(Error::BadDescriptor));
        assert!(matches!(fds.take(fd), Err(Error::BadDescriptor)));
        assert!(fds.take(1).unwrap().is_none());
        assert!(matches!(fds.take(MAX_FDS as i32), Err(Error::InvalidParameter)));

        taken.on_close();
        assert!(stream.closed.get());
        assert_eq!(fds.alloc(&stream), Ok(fd));
    }

    #[test]
    fn test_set_rebinds_standard_descriptor() {
        let console = Console::new();
        let other = Console::new();
        let mut fds = FdTable::new();
        fds.bind_console(&console);

        fds.set(1, Some(&other)).unwrap();
        assert_eq!(fds.write(1, b"x"), Ok(1));
        assert_eq!(other.writes.get(), 1);
        assert_eq!(console.writes.get(), 0);
    }

    // _read and _lseek resolve the stream under the global lock and run
    // the operation after releasing it; the resolved reference must stay
    // usable across table updates in between.
    #[test]
    fn test_resolved_stream_survives_rebinding() {
        let stream = MemStream::new(b"abc");
        let mut fds = FdTable::new();
        let fd = fds.alloc(&stream).unwrap();

        let resolved = fds.get(fd).unwrap();
        fds.set(fd, None).unwrap();

        let mut buf = [0u8; 8];
        assert_eq!(resolved.read(&mut buf), Ok(3));
        assert_eq!(&buf[..3], b"abc");
        assert_eq!(fds.read(fd, &mut buf), Err(Error::BadDescriptor));
    }

    #[test]
    fn test_seek_round_trip() {
        let stream = MemStream::new(b"0123456789");
        let mut fds = FdTable::new();
        let fd = fds.alloc(&stream).unwrap();

        assert_eq!(fds.seek(fd, 5, Whence::Set), Ok(5));
        assert_eq!(fds.seek(fd, 2, Whence::Current), Ok(7));
        assert_eq!(fds.seek(fd, -1, Whence::End), Ok(9));
        assert_eq!(fds.seek(fd, -3, Whence::Set), Err(Error::Io));
    }

    #[test]
    fn test_seek_without_position_ops() {
        let stream = Inert;
        let mut fds = FdTable::new();
        let fd = fds.alloc(&stream).unwrap();

        assert_eq!(fds.seek(fd, 0, Whence::Set), Err(Error::Unsupported));
    }

    #[test]
    fn test_stat_shapes() {
        let file = MemStream::new(b"content");
        let console = Console::new();
        let plain = Inert;
        let mut fds = FdTable::new();
        fds.bind_console(&console);
        let file_fd = fds.alloc(&file).unwrap();
        let plain_fd = fds.alloc(&plain).unwrap();

        let st = fds.stat(1).unwrap();
        assert_eq!(st.kind, FileKind::CharDevice);

        let st = fds.stat(file_fd).unwrap();
        assert_eq!(st.kind, FileKind::Regular);
        assert_eq!(st.size, 7);

        let st = fds.stat(plain_fd).unwrap();
        assert_eq!(st.kind, FileKind::CharDevice);
    }

    #[test]
    fn test_tty_detection() {
        let fds = FdTable::new();
        assert!(fds.is_tty(0));
        assert!(fds.is_tty(2));
        assert!(!fds.is_tty(3));
        assert!(!fds.is_tty(-1));
    }

    #[test]
    fn test_isatty_check_answers_for_any_descriptor() {
        let stream = MemStream::new(b"");
        let mut fds = FdTable::new();
        let bound = fds.alloc(&stream).unwrap();

        for fd in 0..3 {
            assert_eq!(isatty_check(fd), Ok(()));
        }
        // Bound or not, everything past the console reports EBADF.
        assert_eq!(isatty_check(bound), Err(Error::BadDescriptor));
        assert_eq!(isatty_check(9), Err(Error::BadDescriptor));
        assert_eq!(isatty_check(-1), Err(Error::BadDescriptor));
    }

    #[test]
    fn test_unsupported_ops_surface_as_such() {
        let stream = Inert;
        let mut fds = FdTable::new();
        let fd = fds.alloc(&stream).unwrap();
        let mut buf = [0u8; 4];

        assert_eq!(fds.write(fd, b"x"), Err(Error::Unsupported));
        assert_eq!(fds.read(fd, &mut buf), Err(Error::Unsupported));
    }

    #[test]
    fn test_would_block_reads_surface_as_such() {
        let console = EmptyConsole;
        let mut fds = FdTable::new();
        fds.bind_console(&console);
        let mut buf = [0u8; 4];

        assert_eq!(fds.read(0, &mut buf), Err(Error::WouldBlock));
    }

    #[test]
    fn test_heap_grow_and_shrink() {
        let mut heap = Heap::new(0x1000, 0x2000);

        assert_eq!(heap.grow(0), Ok(0x1000));
        assert_eq!(heap.grow(0x100), Ok(0x1000));
        assert_eq!(heap.grow(0), Ok(0x1100));
        assert_eq!(heap.used(), 0x100);
        assert_eq!(heap.free(), 0xF00);

        assert_eq!(heap.grow(-0x80), Ok(0x1100));
        assert_eq!(heap.used(), 0x80);
    }

    #[test]
    fn test_heap_exhaustion_leaves_break_unchanged() {
        let mut heap = Heap::new(0x1000, 0x2000);
        heap.grow(0x800).unwrap();

        assert_eq!(heap.grow(0x900), Err(Error::OutOfMemory));
        assert_eq!(heap.grow(0), Ok(0x1800));

        assert_eq!(heap.grow(-0x900), Err(Error::OutOfMemory));
        assert_eq!(heap.grow(0), Ok(0x1800));

        // Growing exactly to the end is still in range.
        assert_eq!(heap.grow(0x800), Ok(0x1800));
        assert_eq!(heap.free(), 0);
    }

    #[test]
    fn test_stat_struct_layout() {
        assert_eq!(core::mem::size_of::<Stat>(), 60);
        assert_eq!(core::mem::size_of::<Tms>(), 16);
    }
}
