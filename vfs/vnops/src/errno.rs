//! Host status codes.
//!
//! Every status handed back to the host is an errno value of the build
//! target, with `0` meaning success. This is the single place that names
//! them; callers must not spell raw numbers elsewhere.

use std::fmt;

/// A positive errno value as understood by the host kernel.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct Errno(i32);

impl Errno {
    pub const PERM: Errno = Errno(libc::EPERM);
    pub const NOENT: Errno = Errno(libc::ENOENT);
    pub const INTR: Errno = Errno(libc::EINTR);
    pub const IO: Errno = Errno(libc::EIO);
    pub const BADF: Errno = Errno(libc::EBADF);
    pub const AGAIN: Errno = Errno(libc::EAGAIN);
    pub const NOMEM: Errno = Errno(libc::ENOMEM);
    pub const ACCES: Errno = Errno(libc::EACCES);
    pub const FAULT: Errno = Errno(libc::EFAULT);
    pub const BUSY: Errno = Errno(libc::EBUSY);
    pub const EXIST: Errno = Errno(libc::EEXIST);
    pub const XDEV: Errno = Errno(libc::EXDEV);
    pub const NOTDIR: Errno = Errno(libc::ENOTDIR);
    pub const ISDIR: Errno = Errno(libc::EISDIR);
    pub const INVAL: Errno = Errno(libc::EINVAL);
    pub const NOTTY: Errno = Errno(libc::ENOTTY);
    pub const FBIG: Errno = Errno(libc::EFBIG);
    pub const NOSPC: Errno = Errno(libc::ENOSPC);
    pub const ROFS: Errno = Errno(libc::EROFS);
    pub const MLINK: Errno = Errno(libc::EMLINK);
    pub const NAMETOOLONG: Errno = Errno(libc::ENAMETOOLONG);
    pub const NOTEMPTY: Errno = Errno(libc::ENOTEMPTY);
    pub const LOOP: Errno = Errno(libc::ELOOP);
    pub const NOSYS: Errno = Errno(libc::ENOSYS);
    pub const NOTSUP: Errno = Errno(libc::ENOTSUP);
    pub const STALE: Errno = Errno(libc::ESTALE);
    pub const DQUOT: Errno = Errno(libc::EDQUOT);

    /// Wrap a raw status produced by an engine or the host.
    #[inline]
    pub const fn from_raw(raw: i32) -> Self {
        Self(raw)
    }

    /// Raw value as returned to the host.
    #[inline]
    pub const fn raw(self) -> i32 {
        self.0
    }

    /// Stable symbolic name (logging only).
    pub fn name(self) -> &'static str {
        match self {
            Errno::PERM => "EPERM",
            Errno::NOENT => "ENOENT",
            Errno::INTR => "EINTR",
            Errno::IO => "EIO",
            Errno::BADF => "EBADF",
            Errno::AGAIN => "EAGAIN",
            Errno::NOMEM => "ENOMEM",
            Errno::ACCES => "EACCES",
            Errno::FAULT => "EFAULT",
            Errno::BUSY => "EBUSY",
            Errno::EXIST => "EEXIST",
            Errno::XDEV => "EXDEV",
            Errno::NOTDIR => "ENOTDIR",
            Errno::ISDIR => "EISDIR",
            Errno::INVAL => "EINVAL",
            Errno::NOTTY => "ENOTTY",
            Errno::FBIG => "EFBIG",
            Errno::NOSPC => "ENOSPC",
            Errno::ROFS => "EROFS",
            Errno::MLINK => "EMLINK",
            Errno::NAMETOOLONG => "ENAMETOOLONG",
            Errno::NOTEMPTY => "ENOTEMPTY",
            Errno::LOOP => "ELOOP",
            Errno::NOSYS => "ENOSYS",
            Errno::NOTSUP => "ENOTSUP",
            Errno::STALE => "ESTALE",
            Errno::DQUOT => "EDQUOT",
            _ => "E?",
        }
    }
}

impl fmt::Display for Errno {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.name(), self.0)
    }
}

impl From<Errno> for i32 {
    fn from(errno: Errno) -> i32 {
        errno.raw()
    }
}
