//! Device-control commands understood by every vnode class.

use std::time::{SystemTime, UNIX_EPOCH};

use crate::args::{IoctlArgs, VnopId};
use crate::context::Caller;
use crate::errno::Errno;
use crate::error::{VnopError, VnopResult};
use crate::instance::FsInstance;
use crate::types::SyncFlags;

const IOC_OUT: u64 = 0x4000_0000;
const IOCPARM_MASK: u64 = 0x1fff;

/// `_IOR(group, num, T)` with `size_of::<T>() == len`.
const fn ior(group: u8, num: u8, len: u64) -> u64 {
    IOC_OUT | ((len & IOCPARM_MASK) << 16) | ((group as u64) << 8) | num as u64
}

/// Force data and device caches to stable storage.
pub const F_FULLFSYNC: u64 = 51;
pub const SPOTLIGHT_IOC_GET_MOUNT_TIME: u64 = ior(b'h', 18, 4);
pub const SPOTLIGHT_IOC_GET_LAST_MTIME: u64 = ior(b'h', 19, 4);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IoctlCommand {
    FullFsync,
    GetMountTime,
    GetLastUnmountTime,
}

impl IoctlCommand {
    pub fn from_code(code: u64) -> Option<Self> {
        match code {
            F_FULLFSYNC => Some(IoctlCommand::FullFsync),
            SPOTLIGHT_IOC_GET_MOUNT_TIME => Some(IoctlCommand::GetMountTime),
            SPOTLIGHT_IOC_GET_LAST_MTIME => Some(IoctlCommand::GetLastUnmountTime),
            _ => None,
        }
    }

    pub fn code(self) -> u64 {
        match self {
            IoctlCommand::FullFsync => F_FULLFSYNC,
            IoctlCommand::GetMountTime => SPOTLIGHT_IOC_GET_MOUNT_TIME,
            IoctlCommand::GetLastUnmountTime => SPOTLIGHT_IOC_GET_LAST_MTIME,
        }
    }
}

/// Secondary dispatch on the command code. The caller holds the entry
/// guard.
pub(crate) fn dispatch(fs: &FsInstance, ap: &mut IoctlArgs) -> VnopResult<()> {
    let Some(command) = IoctlCommand::from_code(ap.command) else {
        tracing::trace!(command = ap.command, "vnop.ioctl.unknown_command");
        return Err(VnopError::Unsupported(VnopId::Ioctl));
    };

    match command {
        IoctlCommand::FullFsync => {
            fs.engine().fsync(
                ap.vp,
                SyncFlags::WAIT | SyncFlags::FULL,
                Caller::from_context(&ap.ctx),
            )?;
        }
        IoctlCommand::GetMountTime => copy_out_secs(&mut ap.data, fs.mount_time())?,
        IoctlCommand::GetLastUnmountTime => {
            copy_out_secs(&mut ap.data, fs.last_unmount_time())?
        }
    }
    Ok(())
}

fn copy_out_secs(buf: &mut [u8], time: SystemTime) -> VnopResult<()> {
    let secs = time
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs() as u32)
        .unwrap_or(0);
    let out = buf
        .get_mut(..4)
        .ok_or(VnopError::validation(Errno::FAULT, "vnop.ioctl.short_buffer"))?;
    out.copy_from_slice(&secs.to_ne_bytes());
    Ok(())
}
