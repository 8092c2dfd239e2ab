//! A mounted filesystem instance and its single host entry point.

use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use crate::args::VnopArgs;
use crate::context::VnopsConfig;
use crate::engine::{FsEngine, HostKernel};
use crate::errno::Errno;
use crate::error::{ErrorCategory, VnopResult, host_status};
use crate::guard::{EntryGate, EntryGuard, EntryStats};
use crate::ids::MountId;
use crate::table::VnodeOpTables;

pub struct FsInstanceBuilder {
    id: MountId,
    engine: Arc<dyn FsEngine>,
    host: Arc<dyn HostKernel>,
    config: VnopsConfig,
    mount_time: Option<SystemTime>,
    last_unmount_time: SystemTime,
}

impl FsInstanceBuilder {
    pub fn new(id: MountId, engine: Arc<dyn FsEngine>, host: Arc<dyn HostKernel>) -> Self {
        Self {
            id,
            engine,
            host,
            config: VnopsConfig::default(),
            mount_time: None,
            last_unmount_time: UNIX_EPOCH,
        }
    }

    pub fn with_config(mut self, config: VnopsConfig) -> Self {
        self.config = config;
        self
    }

    /// Defaults to the host clock at `build`.
    pub fn with_mount_time(mut self, time: SystemTime) -> Self {
        self.mount_time = Some(time);
        self
    }

    /// Unmount time recorded by the previous mount of this filesystem.
    pub fn with_last_unmount_time(mut self, time: SystemTime) -> Self {
        self.last_unmount_time = time;
        self
    }

    pub fn build(self) -> Arc<FsInstance> {
        let mount_time = self.mount_time.unwrap_or_else(|| self.host.now());
        tracing::debug!(mount = self.id.get(), "vnops.instance.mounted");
        Arc::new(FsInstance {
            id: self.id,
            config: self.config,
            engine: self.engine,
            host: self.host,
            tables: VnodeOpTables::new(),
            gate: EntryGate::new(),
            unmount_lock: Mutex::new(()),
            mount_time,
            last_unmount_time: Mutex::new(self.last_unmount_time),
        })
    }
}

/// One mounted filesystem.
///
/// Owns the per-class dispatch tables and the busy accounting that keeps
/// teardown from completing under an in-flight vnop.
pub struct FsInstance {
    id: MountId,
    config: VnopsConfig,
    engine: Arc<dyn FsEngine>,
    host: Arc<dyn HostKernel>,
    tables: VnodeOpTables,
    gate: EntryGate,
    // Held across begin/wait/cancel so unmounts never interleave.
    unmount_lock: Mutex<()>,
    mount_time: SystemTime,
    last_unmount_time: Mutex<SystemTime>,
}

impl FsInstance {
    pub fn builder(
        id: MountId,
        engine: Arc<dyn FsEngine>,
        host: Arc<dyn HostKernel>,
    ) -> FsInstanceBuilder {
        FsInstanceBuilder::new(id, engine, host)
    }

    pub fn id(&self) -> MountId {
        self.id
    }

    pub fn config(&self) -> &VnopsConfig {
        &self.config
    }

    pub fn tables(&self) -> &VnodeOpTables {
        &self.tables
    }

    pub(crate) fn engine(&self) -> &dyn FsEngine {
        self.engine.as_ref()
    }

    pub(crate) fn host(&self) -> &dyn HostKernel {
        self.host.as_ref()
    }

    /// Run one vnop and return the host status (`0` or an errno).
    ///
    /// The table is chosen by the class of the bundle's primary vnode.
    pub fn dispatch(&self, args: VnopArgs<'_>) -> i32 {
        let op = args.id();
        let vp = args.vnode();
        let ctx = args.ctx().id();

        let vnop = self.tables.get(vp.class()).resolve(op);
        let result = vnop(self, args);

        match &result {
            Ok(()) => tracing::trace!(?op, class = ?vp.class(), ctx, "vnop.ok"),
            Err(err) if err.category() == ErrorCategory::Engine => {
                tracing::debug!(?op, class = ?vp.class(), ctx, error = %err, "vnop.engine_error")
            }
            Err(err) => tracing::trace!(?op, class = ?vp.class(), ctx, error = %err, "vnop.failed"),
        }
        host_status(&result)
    }

    pub(crate) fn enter(&self) -> VnopResult<EntryGuard<'_>> {
        self.gate.enter()
    }

    /// Refuse new entries from now on.
    pub fn begin_teardown(&self) {
        if self.gate.begin_teardown() {
            tracing::debug!(mount = self.id.get(), "vnops.teardown.begin");
        }
    }

    /// Block until no vnop is in flight. `None` waits indefinitely.
    /// Returns `false` if the timeout elapsed first.
    pub fn wait_for_quiescence(&self, timeout: Option<Duration>) -> bool {
        self.gate.wait_idle(timeout)
    }

    /// Begin teardown and wait for in-flight vnops to drain.
    ///
    /// If `teardown_timeout` elapses first `EBUSY` is returned, and the
    /// instance goes back to accepting vnops unless teardown had already
    /// been started by [`FsInstance::begin_teardown`]. Concurrent calls
    /// run one after the other.
    pub fn unmount(&self) -> Result<(), Errno> {
        let _serial = self.unmount_lock.lock();
        let began = self.gate.begin_teardown();
        if began {
            tracing::debug!(mount = self.id.get(), "vnops.teardown.begin");
        }
        if !self.wait_for_quiescence(self.config.teardown_timeout) {
            if began {
                self.gate.cancel_teardown();
            }
            tracing::warn!(
                mount = self.id.get(),
                busy = self.gate.busy(),
                "vnops.unmount.busy"
            );
            return Err(Errno::BUSY);
        }

        *self.last_unmount_time.lock() = self.host.now();
        tracing::debug!(mount = self.id.get(), "vnops.unmount.done");
        Ok(())
    }

    pub fn is_tearing_down(&self) -> bool {
        self.gate.is_tearing_down()
    }

    /// Vnops currently holding an entry guard.
    pub fn busy(&self) -> u64 {
        self.gate.busy()
    }

    pub fn entry_stats(&self) -> EntryStats {
        self.gate.stats()
    }

    pub fn mount_time(&self) -> SystemTime {
        self.mount_time
    }

    pub fn last_unmount_time(&self) -> SystemTime {
        *self.last_unmount_time.lock()
    }
}

impl std::fmt::Debug for FsInstance {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FsInstance")
            .field("id", &self.id)
            .field("config", &self.config)
            .field("busy", &self.busy())
            .field("tearing_down", &self.is_tearing_down())
            .finish_non_exhaustive()
    }
}
