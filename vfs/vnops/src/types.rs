//! Value types shared by the host-facing bundles and the engine interface.

use bitflags::bitflags;

use crate::errno::Errno;
use crate::error::{VnopError, VnopResult};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NodeKind {
    RegularFile,
    Directory,
    Symlink,
    BlockDevice,
    CharDevice,
    Fifo,
    Socket,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Timespec {
    pub secs: i64,
    pub nanos: u32,
}

bitflags! {
    /// `va_vaflags` of the host attribute struct.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct VaFlags: u32 {
        const UTIMES_NULL = 0x0001;
        const EXCLUSIVE = 0x0002;
        const NOINHERIT = 0x0004;
        const NOAUTH = 0x0008;
    }
}

/// Host attribute struct. Unset fields are `None`.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct VnodeAttr {
    pub kind: Option<NodeKind>,
    pub mode: Option<u32>,
    pub uid: Option<u32>,
    pub gid: Option<u32>,
    pub size: Option<u64>,
    pub nlink: Option<u64>,
    pub rdev: Option<u32>,
    pub atime: Option<Timespec>,
    pub mtime: Option<Timespec>,
    pub ctime: Option<Timespec>,
    pub vaflags: VaFlags,
}

impl VnodeAttr {
    /// Derived create mode: exclusive iff the host set `VA_EXCLUSIVE`.
    pub fn create_mode(&self) -> CreateMode {
        if self.vaflags.contains(VaFlags::EXCLUSIVE) {
            CreateMode::Exclusive
        } else {
            CreateMode::NonExclusive
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum CreateMode {
    /// Fail if the name already exists.
    Exclusive,
    NonExclusive,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum NameOp {
    Lookup,
    Create,
    Delete,
    Rename,
}

bitflags! {
    /// `cn_flags` of the host component name.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct LookupFlags: u32 {
        const FOLLOW = 0x0040;
        const ISDOTDOT = 0x2000;
        const MAKEENTRY = 0x4000;
        const ISLASTCN = 0x8000;
    }
}

/// One path segment plus the host's lookup metadata.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ComponentName {
    name: Vec<u8>,
    pub nameiop: NameOp,
    pub flags: LookupFlags,
}

impl ComponentName {
    pub fn new(name: impl Into<Vec<u8>>, nameiop: NameOp, flags: LookupFlags) -> Self {
        Self {
            name: name.into(),
            nameiop,
            flags,
        }
    }

    pub fn lookup(name: impl Into<Vec<u8>>) -> Self {
        Self::new(name, NameOp::Lookup, LookupFlags::ISLASTCN)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.name
    }

    pub fn len(&self) -> usize {
        self.name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.name.is_empty()
    }

    /// Enforce the maximum component length: names of `max_len` bytes or
    /// more never reach the engine.
    pub fn check_len(&self, max_len: usize, context: &'static str) -> VnopResult<()> {
        if self.name.len() >= max_len {
            return Err(VnopError::validation(Errno::NAMETOOLONG, context));
        }
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum UioRw {
    Read,
    Write,
}

/// Host I/O descriptor.
///
/// For reads the buffer is the caller's destination and is filled from
/// the front; for writes it holds the payload. `transferred` counts the
/// bytes moved so far in either direction.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Uio {
    offset: u64,
    rw: UioRw,
    buf: Vec<u8>,
    transferred: usize,
}

impl Uio {
    pub fn for_read(offset: u64, len: usize) -> Self {
        Self {
            offset,
            rw: UioRw::Read,
            buf: vec![0; len],
            transferred: 0,
        }
    }

    pub fn for_write(offset: u64, data: impl Into<Vec<u8>>) -> Self {
        Self {
            offset,
            rw: UioRw::Write,
            buf: data.into(),
            transferred: 0,
        }
    }

    pub fn rw(&self) -> UioRw {
        self.rw
    }

    /// Current offset; advances with every byte moved.
    pub fn offset(&self) -> u64 {
        self.offset
    }

    pub fn resid(&self) -> usize {
        self.buf.len() - self.transferred
    }

    pub fn transferred(&self) -> usize {
        self.transferred
    }

    /// Read direction: copy as much of `src` as fits into the caller buffer.
    pub fn copy_out(&mut self, src: &[u8]) -> usize {
        let n = src.len().min(self.resid());
        let start = self.transferred;
        self.buf[start..start + n].copy_from_slice(&src[..n]);
        self.advance(n);
        n
    }

    /// Write direction: bytes not yet consumed.
    pub fn pending(&self) -> &[u8] {
        &self.buf[self.transferred..]
    }

    /// Mark `n` bytes as moved.
    pub fn advance(&mut self, n: usize) {
        let n = n.min(self.resid());
        self.transferred += n;
        self.offset = self.offset.saturating_add(n as u64);
    }

    /// Read direction: the bytes filled so far.
    pub fn filled(&self) -> &[u8] {
        &self.buf[..self.transferred]
    }
}

bitflags! {
    /// Host `ioflag` bits of read/write.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct IoFlags: u32 {
        const UNIT = 0x0001;
        const APPEND = 0x0002;
        const SYNC = 0x0004;
        const NODELOCKED = 0x0008;
        const NDELAY = 0x0010;
        const NOZEROFILL = 0x0020;
        const TAILZEROFILL = 0x0040;
        const HEADZEROFILL = 0x0080;
        const NOZEROVALID = 0x0100;
        const NOZERODIRTY = 0x0200;
        const CLOSE = 0x0400;
        const NOCACHE = 0x0800;
        const RAOFF = 0x1000;
        const DEFWRITE = 0x2000;
    }
}

bitflags! {
    /// I/O flags in the engine's representation.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct EngineIoFlags: u32 {
        const APPEND = 1 << 0;
        const SYNC = 1 << 1;
        const DSYNC = 1 << 2;
        const RSYNC = 1 << 3;
        const NONBLOCK = 1 << 4;
        const DIRECT = 1 << 5;
    }
}

impl From<IoFlags> for EngineIoFlags {
    fn from(host: IoFlags) -> Self {
        let mut flags = EngineIoFlags::empty();
        if host.contains(IoFlags::APPEND) {
            flags |= EngineIoFlags::APPEND;
        }
        if host.contains(IoFlags::SYNC) {
            flags |= EngineIoFlags::SYNC | EngineIoFlags::DSYNC | EngineIoFlags::RSYNC;
        }
        if host.contains(IoFlags::NDELAY) {
            flags |= EngineIoFlags::NONBLOCK;
        }
        if host.contains(IoFlags::NOCACHE) {
            flags |= EngineIoFlags::DIRECT;
        }
        flags
    }
}

bitflags! {
    /// Open-file flags passed to open/close (`FREAD`, `FWRITE`, ...).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct FileFlags: u32 {
        const READ = 0x0001;
        const WRITE = 0x0002;
        const NONBLOCK = 0x0004;
        const APPEND = 0x0008;
        const CREAT = 0x0200;
        const TRUNC = 0x0400;
        const EXCL = 0x0800;
    }
}

bitflags! {
    /// Access check request (`R_OK`/`W_OK`/`X_OK`).
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct AccessMode: u32 {
        const EXECUTE = 0x1;
        const WRITE = 0x2;
        const READ = 0x4;
    }
}

/// `waitfor` values of fsync.
pub const MNT_WAIT: i32 = 1;
pub const MNT_NOWAIT: i32 = 2;

bitflags! {
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct SyncFlags: u32 {
        /// Wait for the data to reach stable storage.
        const WAIT = 1 << 0;
        /// Also flush device caches (forced durable sync).
        const FULL = 1 << 1;
    }
}

/// What the engine reports after filling a readdir buffer.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct ReaddirOutcome {
    pub eof: bool,
    pub entries: u32,
}
