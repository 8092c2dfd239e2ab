//! Shared table entries for operations without engine semantics.

use crate::args::{VnopArgs, VnopId};
use crate::errno::Errno;
use crate::error::{VnopError, VnopResult};
use crate::ids::VnodeClass;
use crate::instance::FsInstance;

/// Operations accepted by the host ABI that succeed here without doing
/// anything, per vnode class. The class tables install the shared
/// no-op entry for exactly these identifiers.
pub struct StubPolicy;

const DIRECTORY_NOOPS: &[VnopId] = &[
    VnopId::Whiteout,
    VnopId::Inactive,
    VnopId::Reclaim,
    VnopId::Getxattr,
    VnopId::Setxattr,
    VnopId::Removexattr,
    VnopId::Listxattr,
    VnopId::Readdirattr,
];

#[cfg(not(feature = "named-streams"))]
const FILE_NOOPS: &[VnopId] = &[
    VnopId::Whiteout,
    VnopId::Select,
    VnopId::Inactive,
    VnopId::Reclaim,
    VnopId::Pagein,
    VnopId::Pageout,
    VnopId::Mmap,
    VnopId::Blktooff,
    VnopId::Offtoblk,
    VnopId::Blockmap,
    VnopId::Strategy,
    VnopId::Allocate,
    VnopId::Exchange,
    VnopId::Getxattr,
    VnopId::Setxattr,
    VnopId::Removexattr,
    VnopId::Listxattr,
];

#[cfg(feature = "named-streams")]
const FILE_NOOPS: &[VnopId] = &[
    VnopId::Whiteout,
    VnopId::Select,
    VnopId::Inactive,
    VnopId::Reclaim,
    VnopId::Pagein,
    VnopId::Pageout,
    VnopId::Mmap,
    VnopId::Blktooff,
    VnopId::Offtoblk,
    VnopId::Blockmap,
    VnopId::Strategy,
    VnopId::Allocate,
    VnopId::Exchange,
    VnopId::Getxattr,
    VnopId::Setxattr,
    VnopId::Removexattr,
    VnopId::Listxattr,
    VnopId::Getnamedstream,
    VnopId::Makenamedstream,
    VnopId::Removenamedstream,
];

const SYMLINK_NOOPS: &[VnopId] = &[
    VnopId::Inactive,
    VnopId::Reclaim,
    VnopId::Getxattr,
    VnopId::Setxattr,
    VnopId::Removexattr,
    VnopId::Listxattr,
];

const XATTR_DIR_NOOPS: &[VnopId] = &[
    VnopId::Whiteout,
    VnopId::Select,
    VnopId::Inactive,
    VnopId::Reclaim,
];

const ERROR_NOOPS: &[VnopId] = &[VnopId::Inactive, VnopId::Reclaim];

impl StubPolicy {
    pub fn noop_ops(class: VnodeClass) -> &'static [VnopId] {
        match class {
            VnodeClass::Directory => DIRECTORY_NOOPS,
            VnodeClass::RegularFile => FILE_NOOPS,
            VnodeClass::Symlink => SYMLINK_NOOPS,
            VnodeClass::XattrDirectory => XATTR_DIR_NOOPS,
            VnodeClass::Error => ERROR_NOOPS,
        }
    }

    pub fn is_noop(class: VnodeClass, id: VnopId) -> bool {
        Self::noop_ops(class).contains(&id)
    }
}

/// Success without side effects. Output fields are left as the host
/// initialized them.
pub(crate) fn noop(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    tracing::trace!(mount = fs.id().get(), op = ?args.id(), "vnop.noop");
    Ok(())
}

pub(crate) fn is_dir(_fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    Err(VnopError::Rejected {
        op: args.id(),
        errno: Errno::ISDIR,
    })
}

pub(crate) fn inval(_fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    Err(VnopError::Rejected {
        op: args.id(),
        errno: Errno::INVAL,
    })
}

/// Entry for identifiers a class table does not map.
pub(crate) fn default_vnop(_fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    Err(VnopError::Unsupported(args.id()))
}
