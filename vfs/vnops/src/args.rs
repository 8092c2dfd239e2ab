//! Host argument bundles, one typed struct per vnop.
//!
//! Field names follow the host's `a_*` members without the prefix. Fields
//! documented as outputs are written by the adapter; everything else is
//! read-only input.

use crate::context::CallContext;
use crate::errno::Errno;
use crate::error::{VnopError, VnopResult};
use crate::ids::VnodeHandle;
use crate::types::{AccessMode, ComponentName, FileFlags, IoFlags, Uio, VnodeAttr};

/// Implemented by every bundle type; ties it to its [`VnopId`] and
/// [`VnopArgs`] variant.
pub trait VnopBundle: Sized {
    const ID: VnopId;

    /// The vnode whose class selects the dispatch table.
    fn vnode(&self) -> VnodeHandle;

    fn ctx(&self) -> &CallContext;

    fn from_args<'a>(args: VnopArgs<'a>) -> Option<&'a mut Self>;
}

macro_rules! vnop_bundles {
    ($($id:ident => $args:ident [$vnode:ident],)*) => {
        /// Identifier of one host filesystem request type.
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
        pub enum VnopId {
            $($id,)*
        }

        impl VnopId {
            pub const ALL: &'static [VnopId] = &[$(VnopId::$id,)*];
            pub const COUNT: usize = Self::ALL.len();

            #[inline]
            pub fn index(self) -> usize {
                self as usize
            }
        }

        /// One in-flight vnop: a mutable borrow of its host bundle.
        #[derive(Debug)]
        pub enum VnopArgs<'a> {
            $($id(&'a mut $args),)*
        }

        impl VnopArgs<'_> {
            pub fn id(&self) -> VnopId {
                match self {
                    $(VnopArgs::$id(_) => VnopId::$id,)*
                }
            }

            pub fn vnode(&self) -> VnodeHandle {
                match self {
                    $(VnopArgs::$id(ap) => ap.vnode(),)*
                }
            }

            pub fn ctx(&self) -> &CallContext {
                match self {
                    $(VnopArgs::$id(ap) => ap.ctx(),)*
                }
            }
        }

        $(
            impl VnopBundle for $args {
                const ID: VnopId = VnopId::$id;

                fn vnode(&self) -> VnodeHandle {
                    self.$vnode
                }

                fn ctx(&self) -> &CallContext {
                    &self.ctx
                }

                fn from_args<'a>(args: VnopArgs<'a>) -> Option<&'a mut Self> {
                    match args {
                        VnopArgs::$id(ap) => Some(ap),
                        _ => None,
                    }
                }
            }

            impl<'a> From<&'a mut $args> for VnopArgs<'a> {
                fn from(ap: &'a mut $args) -> Self {
                    VnopArgs::$id(ap)
                }
            }
        )*
    };
}

vnop_bundles! {
    Lookup => LookupArgs [dvp],
    Create => CreateArgs [dvp],
    Whiteout => WhiteoutArgs [dvp],
    Mknod => MknodArgs [dvp],
    Open => OpenArgs [vp],
    Close => CloseArgs [vp],
    Access => AccessArgs [vp],
    Getattr => GetattrArgs [vp],
    Setattr => SetattrArgs [vp],
    Read => ReadArgs [vp],
    Write => WriteArgs [vp],
    Ioctl => IoctlArgs [vp],
    Select => SelectArgs [vp],
    Fsync => FsyncArgs [vp],
    Remove => RemoveArgs [dvp],
    Link => LinkArgs [tdvp],
    Rename => RenameArgs [fdvp],
    Mkdir => MkdirArgs [dvp],
    Rmdir => RmdirArgs [dvp],
    Symlink => SymlinkArgs [dvp],
    Readdir => ReaddirArgs [vp],
    Readlink => ReadlinkArgs [vp],
    Inactive => InactiveArgs [vp],
    Reclaim => ReclaimArgs [vp],
    Pathconf => PathconfArgs [vp],
    Revoke => RevokeArgs [vp],
    Getxattr => GetxattrArgs [vp],
    Setxattr => SetxattrArgs [vp],
    Removexattr => RemovexattrArgs [vp],
    Listxattr => ListxattrArgs [vp],
    Readdirattr => ReaddirattrArgs [vp],
    Pagein => PageinArgs [vp],
    Pageout => PageoutArgs [vp],
    Mmap => MmapArgs [vp],
    Blktooff => BlktooffArgs [vp],
    Offtoblk => OfftoblkArgs [vp],
    Blockmap => BlockmapArgs [vp],
    Strategy => StrategyArgs [vp],
    Allocate => AllocateArgs [vp],
    Exchange => ExchangeArgs [fvp],
    Getnamedstream => GetnamedstreamArgs [vp],
    Makenamedstream => MakenamedstreamArgs [vp],
    Removenamedstream => RemovenamedstreamArgs [vp],
    Advlock => AdvlockArgs [vp],
    Mnomap => MnomapArgs [vp],
}

impl<'a> VnopArgs<'a> {
    /// Unwrap the bundle an adapter was registered for.
    pub(crate) fn bundle<A: VnopBundle>(self) -> VnopResult<&'a mut A> {
        A::from_args(self).ok_or(VnopError::validation(Errno::INVAL, "vnop.bundle_mismatch"))
    }
}

#[derive(Debug)]
pub struct LookupArgs {
    pub dvp: VnodeHandle,
    pub cnp: ComponentName,
    pub ctx: CallContext,
    /// Output: the node found.
    pub vpp: Option<VnodeHandle>,
}

#[derive(Debug)]
pub struct CreateArgs {
    pub dvp: VnodeHandle,
    pub cnp: ComponentName,
    pub vap: VnodeAttr,
    pub ctx: CallContext,
    /// Output: the created (or, non-exclusively, existing) node.
    pub vpp: Option<VnodeHandle>,
    /// Set when another vnop built this bundle and delegated to create.
    pub synthesized_by: Option<VnopId>,
}

impl CreateArgs {
    pub fn new(dvp: VnodeHandle, cnp: ComponentName, vap: VnodeAttr, ctx: CallContext) -> Self {
        Self {
            dvp,
            cnp,
            vap,
            ctx,
            vpp: None,
            synthesized_by: None,
        }
    }

    /// Equivalent create request for a node-creation (mknod) call.
    pub fn from_mknod(ap: &MknodArgs) -> Self {
        Self {
            dvp: ap.dvp,
            cnp: ap.cnp.clone(),
            vap: ap.vap.clone(),
            ctx: ap.ctx.clone(),
            vpp: None,
            synthesized_by: Some(VnopId::Mknod),
        }
    }
}

#[derive(Debug)]
pub struct WhiteoutArgs {
    pub dvp: VnodeHandle,
    pub cnp: ComponentName,
    pub flags: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct MknodArgs {
    pub dvp: VnodeHandle,
    pub cnp: ComponentName,
    pub vap: VnodeAttr,
    pub ctx: CallContext,
    /// Output.
    pub vpp: Option<VnodeHandle>,
}

#[derive(Debug)]
pub struct OpenArgs {
    pub vp: VnodeHandle,
    pub mode: FileFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct CloseArgs {
    pub vp: VnodeHandle,
    pub fflag: FileFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct AccessArgs {
    pub vp: VnodeHandle,
    pub mode: AccessMode,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct GetattrArgs {
    pub vp: VnodeHandle,
    /// Output: filled from the engine's attributes.
    pub vap: VnodeAttr,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct SetattrArgs {
    pub vp: VnodeHandle,
    pub vap: VnodeAttr,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct ReadArgs {
    pub vp: VnodeHandle,
    /// In/out: bytes transferred are tracked by the descriptor itself.
    pub uio: Uio,
    pub ioflag: IoFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct WriteArgs {
    pub vp: VnodeHandle,
    pub uio: Uio,
    pub ioflag: IoFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct IoctlArgs {
    pub vp: VnodeHandle,
    pub command: u64,
    /// Caller-supplied buffer for commands that return data.
    pub data: Vec<u8>,
    pub fflag: FileFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct SelectArgs {
    pub vp: VnodeHandle,
    pub which: i32,
    pub fflags: FileFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct FsyncArgs {
    pub vp: VnodeHandle,
    /// `MNT_WAIT`, `MNT_NOWAIT`, ...
    pub waitfor: i32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct RemoveArgs {
    pub dvp: VnodeHandle,
    pub vp: VnodeHandle,
    pub cnp: ComponentName,
    pub flags: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct LinkArgs {
    /// Existing node to link to.
    pub vp: VnodeHandle,
    /// Directory receiving the new entry.
    pub tdvp: VnodeHandle,
    pub cnp: ComponentName,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct RenameArgs {
    pub fdvp: VnodeHandle,
    pub fvp: VnodeHandle,
    pub fcnp: ComponentName,
    pub tdvp: VnodeHandle,
    pub tvp: Option<VnodeHandle>,
    pub tcnp: ComponentName,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct MkdirArgs {
    pub dvp: VnodeHandle,
    pub cnp: ComponentName,
    pub vap: VnodeAttr,
    pub ctx: CallContext,
    /// Output.
    pub vpp: Option<VnodeHandle>,
}

#[derive(Debug)]
pub struct RmdirArgs {
    pub dvp: VnodeHandle,
    pub vp: VnodeHandle,
    pub cnp: ComponentName,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct SymlinkArgs {
    pub dvp: VnodeHandle,
    pub cnp: ComponentName,
    pub vap: VnodeAttr,
    pub target: String,
    pub ctx: CallContext,
    /// Output.
    pub vpp: Option<VnodeHandle>,
}

#[derive(Debug)]
pub struct ReaddirArgs {
    pub vp: VnodeHandle,
    pub uio: Uio,
    pub flags: u32,
    pub ctx: CallContext,
    /// Output: set once the engine reached the end of the directory.
    pub eofflag: bool,
    /// Output: entries copied into `uio`. Always reset before delegation.
    pub numdirent: u32,
}

impl ReaddirArgs {
    pub fn new(vp: VnodeHandle, uio: Uio, ctx: CallContext) -> Self {
        Self {
            vp,
            uio,
            flags: 0,
            ctx,
            eofflag: false,
            numdirent: 0,
        }
    }
}

#[derive(Debug)]
pub struct ReadlinkArgs {
    pub vp: VnodeHandle,
    pub uio: Uio,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct InactiveArgs {
    pub vp: VnodeHandle,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct ReclaimArgs {
    pub vp: VnodeHandle,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct PathconfArgs {
    pub vp: VnodeHandle,
    /// `_PC_*` selector.
    pub name: i32,
    pub ctx: CallContext,
    /// Output.
    pub retval: i64,
}

#[derive(Debug)]
pub struct RevokeArgs {
    pub vp: VnodeHandle,
    pub flags: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct GetxattrArgs {
    pub vp: VnodeHandle,
    pub name: String,
    pub uio: Option<Uio>,
    /// Output: attribute size when `uio` is absent.
    pub size: usize,
    pub options: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct SetxattrArgs {
    pub vp: VnodeHandle,
    pub name: String,
    pub uio: Uio,
    pub options: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct RemovexattrArgs {
    pub vp: VnodeHandle,
    pub name: String,
    pub options: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct ListxattrArgs {
    pub vp: VnodeHandle,
    pub uio: Option<Uio>,
    /// Output.
    pub size: usize,
    pub options: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct ReaddirattrArgs {
    pub vp: VnodeHandle,
    pub uio: Uio,
    pub maxcount: u64,
    pub options: u64,
    pub ctx: CallContext,
    /// Output.
    pub newstate: u64,
    /// Output.
    pub eofflag: bool,
    /// Output.
    pub actualcount: u64,
}

#[derive(Debug)]
pub struct PageinArgs {
    pub vp: VnodeHandle,
    pub pl_offset: u64,
    pub foffset: i64,
    pub size: usize,
    pub flags: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct PageoutArgs {
    pub vp: VnodeHandle,
    pub pl_offset: u64,
    pub foffset: i64,
    pub size: usize,
    pub flags: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct MmapArgs {
    pub vp: VnodeHandle,
    pub fflags: FileFlags,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct BlktooffArgs {
    pub vp: VnodeHandle,
    pub lblkno: i64,
    pub ctx: CallContext,
    /// Output.
    pub offset: i64,
}

#[derive(Debug)]
pub struct OfftoblkArgs {
    pub vp: VnodeHandle,
    pub offset: i64,
    pub ctx: CallContext,
    /// Output.
    pub lblkno: i64,
}

#[derive(Debug)]
pub struct BlockmapArgs {
    pub vp: VnodeHandle,
    pub foffset: i64,
    pub size: usize,
    pub flags: u32,
    pub ctx: CallContext,
    /// Output.
    pub bpn: i64,
    /// Output.
    pub run: usize,
}

#[derive(Debug)]
pub struct StrategyArgs {
    /// Vnode of the buffer being scheduled.
    pub vp: VnodeHandle,
    pub blkno: i64,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct AllocateArgs {
    pub vp: VnodeHandle,
    pub length: i64,
    pub flags: u32,
    pub offset: i64,
    pub ctx: CallContext,
    /// Output.
    pub bytesallocated: i64,
}

#[derive(Debug)]
pub struct ExchangeArgs {
    pub fvp: VnodeHandle,
    pub tvp: VnodeHandle,
    pub options: u32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct GetnamedstreamArgs {
    pub vp: VnodeHandle,
    pub name: String,
    pub ctx: CallContext,
    /// Output.
    pub svpp: Option<VnodeHandle>,
}

#[derive(Debug)]
pub struct MakenamedstreamArgs {
    pub vp: VnodeHandle,
    pub name: String,
    pub ctx: CallContext,
    /// Output.
    pub svpp: Option<VnodeHandle>,
}

#[derive(Debug)]
pub struct RemovenamedstreamArgs {
    pub vp: VnodeHandle,
    pub svp: Option<VnodeHandle>,
    pub name: String,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct AdvlockArgs {
    pub vp: VnodeHandle,
    pub id: u64,
    pub op: i32,
    pub flags: i32,
    pub ctx: CallContext,
}

#[derive(Debug)]
pub struct MnomapArgs {
    pub vp: VnodeHandle,
    pub ctx: CallContext,
}
