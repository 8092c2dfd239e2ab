use smallvec::SmallVec;
use std::sync::Arc;
use std::time::Duration;

/// Adapter configuration, fixed for the lifetime of an instance.
#[derive(Clone, Debug)]
pub struct VnopsConfig {
    /// Component names of this many bytes or more are rejected before
    /// they reach the engine.
    pub max_name_len: usize,
    /// How long `unmount` waits for in-flight vnops. `None` waits forever.
    pub teardown_timeout: Option<Duration>,
}

impl Default for VnopsConfig {
    fn default() -> Self {
        Self {
            max_name_len: 256,
            teardown_timeout: None,
        }
    }
}

/// Actor identity supplied by the host. Never inspected here.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Credential {
    pub uid: u32,
    pub gid: u32,
    pub groups: SmallVec<[u32; 8]>,
}

impl Credential {
    pub fn root() -> Self {
        Self {
            uid: 0,
            gid: 0,
            groups: SmallVec::new(),
        }
    }
}

/// Per-call context token (audit/cancellation metadata) owned by the host.
#[derive(Clone, Debug)]
pub struct CallContext {
    id: u64,
    cred: Arc<Credential>,
}

impl CallContext {
    pub fn new(id: u64, cred: Arc<Credential>) -> Self {
        Self { id, cred }
    }

    pub fn id(&self) -> u64 {
        self.id
    }

    pub fn credential(&self) -> &Credential {
        &self.cred
    }
}

/// Credential and context of one vnop, as forwarded to the engine.
#[derive(Clone, Copy, Debug)]
pub struct Caller<'a> {
    pub cred: &'a Credential,
    pub ctx: &'a CallContext,
}

impl<'a> Caller<'a> {
    pub fn from_context(ctx: &'a CallContext) -> Self {
        Self {
            cred: ctx.credential(),
            ctx,
        }
    }
}
