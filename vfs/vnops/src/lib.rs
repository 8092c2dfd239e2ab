//! Host vnode-operation adapter.
//!
//! Translates host-kernel vnode operations (typed argument bundles,
//! opaque vnode handles, caller credentials) into calls on a
//! [`FsEngine`], and engine results back into host errno statuses.
//!
//! A mounted [`FsInstance`] owns one operation table per [`VnodeClass`]
//! and an entry guard that keeps teardown from completing while a vnop
//! is in flight. [`FsInstance::dispatch`] is the only host entry point.

mod adapter;
pub mod args;
pub mod context;
pub mod engine;
pub mod errno;
pub mod error;
pub mod guard;
pub mod ids;
pub mod instance;
pub mod ioctl;
pub mod stub;
pub mod table;
pub mod types;

pub use args::{VnopArgs, VnopBundle, VnopId};
pub use context::{CallContext, Caller, Credential, VnopsConfig};
pub use engine::{FsEngine, HostKernel};
pub use errno::Errno;
pub use error::{EngineResult, ErrorCategory, VnopError, VnopResult, host_status};
pub use guard::{EntryGuard, EntryStats};
pub use ids::{MountId, NodeId, VnodeClass, VnodeHandle};
pub use instance::{FsInstance, FsInstanceBuilder};
pub use ioctl::IoctlCommand;
pub use stub::StubPolicy;
pub use table::{VnodeOpTable, VnodeOpTables, VnopFn};
