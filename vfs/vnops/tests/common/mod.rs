#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use vfs_vnops::types::{
    AccessMode, ComponentName, CreateMode, EngineIoFlags, FileFlags, NodeKind, ReaddirOutcome,
    SyncFlags, Uio, VnodeAttr,
};
use vfs_vnops::{
    CallContext, Caller, Credential, EngineResult, Errno, FsEngine, FsInstance, HostKernel,
    MountId, NodeId, VnodeClass, VnodeHandle, VnopsConfig,
};

pub const FILE_CONTENTS: &[u8] = b"hello world";
pub const LINK_TARGET: &str = "../target";
pub const CLOCK_SECS: u64 = 1_700_000_000;

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EngineCall {
    Open(FileFlags),
    Close(FileFlags),
    Access(AccessMode),
    Read(EngineIoFlags),
    Write(EngineIoFlags),
    Lookup(Vec<u8>),
    Create {
        name: Vec<u8>,
        mode: CreateMode,
        perm: Option<u32>,
    },
    Remove(Vec<u8>),
    Mkdir(Vec<u8>),
    Rmdir(Vec<u8>),
    Readdir,
    Fsync(SyncFlags),
    Getattr,
    Setattr(VnodeAttr),
    Rename {
        from: Vec<u8>,
        to: Vec<u8>,
    },
    Symlink {
        name: Vec<u8>,
        target: String,
    },
    Readlink,
    Link {
        tdvp: NodeId,
        vp: NodeId,
        name: Vec<u8>,
    },
}

/// Engine that records every call and answers from canned state.
pub struct RecordingEngine {
    calls: Mutex<Vec<EngineCall>>,
    callers: Mutex<Vec<(u64, u32)>>,
    failures: Mutex<HashMap<&'static str, Errno>>,
    readdir: Mutex<ReaddirOutcome>,
    live: AtomicBool,
    next_node: AtomicU64,
    // (entered, release) pair, used by `open` to park a caller.
    hold: Mutex<Option<(Arc<Barrier>, Arc<Barrier>)>>,
}

impl RecordingEngine {
    pub fn new() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            callers: Mutex::new(Vec::new()),
            failures: Mutex::new(HashMap::new()),
            readdir: Mutex::new(ReaddirOutcome {
                eof: true,
                entries: 3,
            }),
            live: AtomicBool::new(true),
            next_node: AtomicU64::new(100),
            hold: Mutex::new(None),
        }
    }

    pub fn calls(&self) -> Vec<EngineCall> {
        self.calls.lock().expect("calls lock").clone()
    }

    pub fn callers(&self) -> Vec<(u64, u32)> {
        self.callers.lock().expect("callers lock").clone()
    }

    pub fn fail(&self, op: &'static str, errno: Errno) {
        self.failures.lock().expect("failures lock").insert(op, errno);
    }

    pub fn set_readdir(&self, outcome: ReaddirOutcome) {
        *self.readdir.lock().expect("readdir lock") = outcome;
    }

    pub fn set_live(&self, live: bool) {
        self.live.store(live, Ordering::SeqCst);
    }

    /// Make the next `open` wait on `entered`, then on `release`.
    pub fn hold_open(&self, entered: Arc<Barrier>, release: Arc<Barrier>) {
        *self.hold.lock().expect("hold lock") = Some((entered, release));
    }

    fn record(&self, call: EngineCall, caller: Caller<'_>) {
        self.calls.lock().expect("calls lock").push(call);
        self.callers
            .lock()
            .expect("callers lock")
            .push((caller.ctx.id(), caller.cred.uid));
    }

    fn status(&self, op: &'static str) -> EngineResult<()> {
        match self.failures.lock().expect("failures lock").get(op) {
            Some(errno) => Err(*errno),
            None => Ok(()),
        }
    }

    fn new_node(&self, parent: VnodeHandle, class: VnodeClass) -> VnodeHandle {
        let raw = self.next_node.fetch_add(1, Ordering::SeqCst);
        VnodeHandle::new(parent.mount(), NodeId::new(raw).expect("node id"), class)
    }
}

impl FsEngine for RecordingEngine {
    fn open(&self, _vp: VnodeHandle, mode: FileFlags, caller: Caller<'_>) -> EngineResult<()> {
        self.record(EngineCall::Open(mode), caller);
        let hold = self.hold.lock().expect("hold lock").take();
        if let Some((entered, release)) = hold {
            entered.wait();
            release.wait();
        }
        self.status("open")
    }

    fn close(&self, _vp: VnodeHandle, fflag: FileFlags, caller: Caller<'_>) -> EngineResult<()> {
        self.record(EngineCall::Close(fflag), caller);
        self.status("close")
    }

    fn access(&self, _vp: VnodeHandle, mode: AccessMode, caller: Caller<'_>) -> EngineResult<()> {
        self.record(EngineCall::Access(mode), caller);
        self.status("access")
    }

    fn read(
        &self,
        _vp: VnodeHandle,
        uio: &mut Uio,
        flags: EngineIoFlags,
        caller: Caller<'_>,
    ) -> EngineResult<()> {
        self.record(EngineCall::Read(flags), caller);
        let start = (uio.offset() as usize).min(FILE_CONTENTS.len());
        let src = &FILE_CONTENTS[start..];
        if let Err(errno) = self.status("read") {
            // Partial transfer before the failure.
            uio.copy_out(&src[..src.len().min(2)]);
            return Err(errno);
        }
        uio.copy_out(src);
        Ok(())
    }

    fn write(
        &self,
        _vp: VnodeHandle,
        uio: &mut Uio,
        flags: EngineIoFlags,
        caller: Caller<'_>,
    ) -> EngineResult<()> {
        self.record(EngineCall::Write(flags), caller);
        self.status("write")?;
        let n = uio.pending().len();
        uio.advance(n);
        Ok(())
    }

    fn lookup(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle> {
        self.record(EngineCall::Lookup(cnp.as_bytes().to_vec()), caller);
        self.status("lookup")?;
        Ok(self.new_node(dvp, VnodeClass::RegularFile))
    }

    fn create(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        vap: &VnodeAttr,
        mode: CreateMode,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle> {
        self.record(
            EngineCall::Create {
                name: cnp.as_bytes().to_vec(),
                mode,
                perm: vap.mode,
            },
            caller,
        );
        self.status("create")?;
        Ok(self.new_node(dvp, VnodeClass::RegularFile))
    }

    fn remove(
        &self,
        _dvp: VnodeHandle,
        cnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<()> {
        self.record(EngineCall::Remove(cnp.as_bytes().to_vec()), caller);
        self.status("remove")
    }

    fn mkdir(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        _vap: &VnodeAttr,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle> {
        self.record(EngineCall::Mkdir(cnp.as_bytes().to_vec()), caller);
        self.status("mkdir")?;
        Ok(self.new_node(dvp, VnodeClass::Directory))
    }

    fn rmdir(
        &self,
        _dvp: VnodeHandle,
        cnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<()> {
        self.record(EngineCall::Rmdir(cnp.as_bytes().to_vec()), caller);
        self.status("rmdir")
    }

    fn readdir(
        &self,
        _vp: VnodeHandle,
        _uio: &mut Uio,
        caller: Caller<'_>,
    ) -> EngineResult<ReaddirOutcome> {
        self.record(EngineCall::Readdir, caller);
        self.status("readdir")?;
        Ok(*self.readdir.lock().expect("readdir lock"))
    }

    fn fsync(&self, _vp: VnodeHandle, flags: SyncFlags, caller: Caller<'_>) -> EngineResult<()> {
        self.record(EngineCall::Fsync(flags), caller);
        self.status("fsync")
    }

    fn getattr(&self, _vp: VnodeHandle, caller: Caller<'_>) -> EngineResult<VnodeAttr> {
        self.record(EngineCall::Getattr, caller);
        self.status("getattr")?;
        Ok(VnodeAttr {
            kind: Some(NodeKind::RegularFile),
            mode: Some(0o644),
            size: Some(FILE_CONTENTS.len() as u64),
            nlink: Some(1),
            ..VnodeAttr::default()
        })
    }

    fn setattr(&self, _vp: VnodeHandle, vap: &VnodeAttr, caller: Caller<'_>) -> EngineResult<()> {
        self.record(EngineCall::Setattr(vap.clone()), caller);
        self.status("setattr")
    }

    fn rename(
        &self,
        _fdvp: VnodeHandle,
        fcnp: &ComponentName,
        _tdvp: VnodeHandle,
        tcnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<()> {
        self.record(
            EngineCall::Rename {
                from: fcnp.as_bytes().to_vec(),
                to: tcnp.as_bytes().to_vec(),
            },
            caller,
        );
        self.status("rename")
    }

    fn symlink(
        &self,
        dvp: VnodeHandle,
        cnp: &ComponentName,
        _vap: &VnodeAttr,
        target: &str,
        caller: Caller<'_>,
    ) -> EngineResult<VnodeHandle> {
        self.record(
            EngineCall::Symlink {
                name: cnp.as_bytes().to_vec(),
                target: target.to_string(),
            },
            caller,
        );
        self.status("symlink")?;
        Ok(self.new_node(dvp, VnodeClass::Symlink))
    }

    fn readlink(&self, _vp: VnodeHandle, uio: &mut Uio, caller: Caller<'_>) -> EngineResult<()> {
        self.record(EngineCall::Readlink, caller);
        self.status("readlink")?;
        uio.copy_out(LINK_TARGET.as_bytes());
        Ok(())
    }

    fn link(
        &self,
        tdvp: VnodeHandle,
        vp: VnodeHandle,
        cnp: &ComponentName,
        caller: Caller<'_>,
    ) -> EngineResult<()> {
        self.record(
            EngineCall::Link {
                tdvp: tdvp.node(),
                vp: vp.node(),
                name: cnp.as_bytes().to_vec(),
            },
            caller,
        );
        self.status("link")
    }

    fn is_live(&self, _vp: VnodeHandle) -> bool {
        self.live.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct RecordingHost {
    purges: Mutex<Vec<VnodeHandle>>,
    revokes: Mutex<Vec<(VnodeHandle, u32)>>,
}

impl RecordingHost {
    pub fn purges(&self) -> Vec<VnodeHandle> {
        self.purges.lock().expect("purges lock").clone()
    }

    pub fn revokes(&self) -> Vec<(VnodeHandle, u32)> {
        self.revokes.lock().expect("revokes lock").clone()
    }
}

impl HostKernel for RecordingHost {
    fn cache_purge(&self, dvp: VnodeHandle) {
        self.purges.lock().expect("purges lock").push(dvp);
    }

    fn revoke(&self, vp: VnodeHandle, flags: u32, _ctx: &CallContext) -> Result<(), Errno> {
        self.revokes.lock().expect("revokes lock").push((vp, flags));
        Ok(())
    }

    fn now(&self) -> SystemTime {
        UNIX_EPOCH + Duration::from_secs(CLOCK_SECS)
    }
}

pub struct Fixture {
    pub fs: Arc<FsInstance>,
    pub engine: Arc<RecordingEngine>,
    pub host: Arc<RecordingHost>,
}

impl Fixture {
    pub fn new() -> Self {
        Self::with_config(1, VnopsConfig::default())
    }

    pub fn with_config(mount: u32, config: VnopsConfig) -> Self {
        let engine = Arc::new(RecordingEngine::new());
        let host = Arc::new(RecordingHost::default());
        let fs = FsInstance::builder(
            MountId::new(mount).expect("mount id"),
            engine.clone(),
            host.clone(),
        )
        .with_config(config)
        .build();
        Self { fs, engine, host }
    }

    pub fn vnode(&self, node: u64, class: VnodeClass) -> VnodeHandle {
        VnodeHandle::new(self.fs.id(), NodeId::new(node).expect("node id"), class)
    }

    pub fn dir(&self) -> VnodeHandle {
        self.vnode(2, VnodeClass::Directory)
    }

    pub fn file(&self) -> VnodeHandle {
        self.vnode(3, VnodeClass::RegularFile)
    }
}

pub fn ctx() -> CallContext {
    let cred = Credential {
        uid: 501,
        gid: 20,
        groups: [20, 12, 61].into_iter().collect(),
    };
    CallContext::new(42, Arc::new(cred))
}

pub fn name(len: usize) -> ComponentName {
    ComponentName::lookup(vec![b'n'; len])
}
