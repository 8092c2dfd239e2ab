//! Vnode identity types.

use core::num::{NonZeroU32, NonZeroU64};

/// Identifier of a mounted filesystem instance.
///
/// `0` is reserved for "unset/invalid"; [`MountId::new`] rejects it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct MountId(NonZeroU32);

impl MountId {
    /// Create a mount id from a raw value (must be non-zero).
    #[inline]
    pub fn new(raw: u32) -> Option<Self> {
        NonZeroU32::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u32 {
        self.0.get()
    }
}

/// Engine-defined node identity, stable for the lifetime of the mount.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(transparent)]
pub struct NodeId(NonZeroU64);

impl NodeId {
    #[inline]
    pub fn new(raw: u64) -> Option<Self> {
        NonZeroU64::new(raw).map(Self)
    }

    #[inline]
    pub fn get(self) -> u64 {
        self.0.get()
    }
}

/// Which operation table a vnode was created with.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum VnodeClass {
    Directory,
    RegularFile,
    Symlink,
    XattrDirectory,
    /// Terminal node handed out when the engine could not produce a
    /// usable one; only lifecycle operations are accepted.
    Error,
}

impl VnodeClass {
    pub const ALL: [VnodeClass; 5] = [
        VnodeClass::Directory,
        VnodeClass::RegularFile,
        VnodeClass::Symlink,
        VnodeClass::XattrDirectory,
        VnodeClass::Error,
    ];

    #[inline]
    pub(crate) fn index(self) -> usize {
        self as usize
    }
}

/// Host-owned reference to one filesystem object.
///
/// The adapter only borrows it for the duration of a call. The engine
/// maps it to its own node state.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct VnodeHandle {
    mount: MountId,
    node: NodeId,
    class: VnodeClass,
}

impl VnodeHandle {
    pub fn new(mount: MountId, node: NodeId, class: VnodeClass) -> Self {
        Self { mount, node, class }
    }

    #[inline]
    pub fn mount(&self) -> MountId {
        self.mount
    }

    #[inline]
    pub fn node(&self) -> NodeId {
        self.node
    }

    #[inline]
    pub fn class(&self) -> VnodeClass {
        self.class
    }
}
