//! Collaborator interfaces consumed by the adapter layer.
//!
//! [`FsEngine`] is the filesystem engine's native operation set;
//! [`HostKernel`] covers the few generic services the host provides
//! (name cache, revocation, clock).

use std::time::SystemTime;

use crate::context::{CallContext, Caller};
use crate::errno::Errno;
use crate::error::EngineResult;
use crate::ids::VnodeHandle;
use crate::types::{
    AccessMode, ComponentName, CreateMode, EngineIoFlags, FileFlags, ReaddirOutcome, SyncFlags,
    Uio, VnodeAttr,
};

/// Native operation set of the filesystem engine.
///
/// Every method receives the translated arguments plus the forwarded
/// [`Caller`]. Returned statuses are handed back to the host unmodified.
/// Implementations are responsible for their own locking.
pub trait FsEngine: Send + Sync {
    fn open(&self, vp: VnodeHandle, mode: FileFlags, caller: Caller<'_>) -> EngineResult<()>;

    fn close(&self, vp: VnodeHandle, fflag: FileFlags, caller: Caller<'_>) -> EngineResult<()>;

    fn access(&self, vp: VnodeHandle, mode: AccessMode, caller: Caller<'_>) -> EngineResult<()>;

    /// Fill `uio` from the node. Bytes moved before a failure stay
    /// recorded in the descriptor.
    fn read(
        &self,
        vp: VnodeHandle,
        uio: &mut Uio,
        flags: EngineIoFlags,
        caller: Caller<'_>,
    ) -> EngineResult<()>;

    fn write(
        &self,
        vp: VnodeHandle,
        uio: &mut Uio,
        flags: EngineIoFlags,
        caller: Caller<'_>,
    ) -> EngineResult<()>;

    fn lookup(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle>;

    fn create(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        vap: &VnodeAttr,
        mode: CreateMode,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle>;

    fn remove(&self, dvp: VnodeHandle, cnp: &ComponentName, caller: Caller<'_>)
    -> EngineResult<()>;

    fn mkdir(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        vap: &VnodeAttr,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle>;

    fn rmdir(&self, dvp: VnodeHandle, cnp: &ComponentName, caller: Caller<'_>) -> EngineResult<()>;

    fn readdir(
        &self,
        vp: VnodeHandle,
        uio: &mut Uio,
        caller: Caller<'_>,
    ) -> EngineResult<ReaddirOutcome>;

    fn fsync(&self, vp: VnodeHandle, flags: SyncFlags, caller: Caller<'_>) -> EngineResult<()>;

    fn getattr(&self, vp: VnodeHandle, caller: Caller<'_>) -> EngineResult<VnodeAttr>;

    fn setattr(&self, vp: VnodeHandle, vap: &VnodeAttr, caller: Caller<'_>) -> EngineResult<()>;

    fn rename(
        &self,
        fdvp: VnodeHandle,
        fcnp: &ComponentName,
        tdvp: VnodeHandle,
        tcnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<()>;

    fn symlink(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        vap: &VnodeAttr,
        target: &str,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle>;

    fn readlink(&self, vp: VnodeHandle, uio: &mut Uio, caller: Caller<'_>) -> EngineResult<()>;

    /// Add `cnp` in `tdvp` as a new name for `vp`.
    fn link(
        &self,
        tdvp: VnodeHandle,
        vp: VnodeHandle,
        cnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<()>;

    /// Whether the engine still holds node state for `vp`. A node that
    /// was already reclaimed has nothing left to sync.
    fn is_live(&self, _vp: VnodeHandle) -> bool {
        true
    }
}

/// Generic host services the adapter calls back into.
pub trait HostKernel: Send + Sync {
    /// Drop cached name lookups under `dvp`.
    fn cache_purge(&self, dvp: VnodeHandle);

    /// Generic vnode revocation.
    fn revoke(&self, vp: VnodeHandle, flags: u32, ctx: &CallContext) -> Result<(), Errno>;

    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}
