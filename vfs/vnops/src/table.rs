//! Per-class operation tables.
//!
//! Each vnode class gets a fixed `VnopId -> VnopFn` mapping built once
//! when the instance is constructed. Identifiers a class does not map
//! resolve to the shared "not supported" entry.

use crate::adapter;
use crate::args::{VnopArgs, VnopId};
use crate::error::VnopResult;
use crate::ids::VnodeClass;
use crate::instance::FsInstance;
use crate::stub::{self, StubPolicy};

/// Adapter entry point stored in a table slot.
pub type VnopFn = fn(&FsInstance, VnopArgs<'_>) -> VnopResult<()>;

pub struct VnodeOpTable {
    class: VnodeClass,
    entries: [Option<VnopFn>; VnopId::COUNT],
    stubs: [bool; VnopId::COUNT],
}

impl VnodeOpTable {
    fn builder(class: VnodeClass) -> VnodeOpTableBuilder {
        VnodeOpTableBuilder {
            table: VnodeOpTable {
                class,
                entries: [None; VnopId::COUNT],
                stubs: [false; VnopId::COUNT],
            },
        }
    }

    pub fn class(&self) -> VnodeClass {
        self.class
    }

    pub fn resolve(&self, id: VnopId) -> VnopFn {
        self.entries[id.index()].unwrap_or(stub::default_vnop)
    }

    /// Whether `id` has an entry of its own in this table.
    pub fn supports(&self, id: VnopId) -> bool {
        self.entries[id.index()].is_some()
    }

    /// Whether `id` maps to the shared no-op entry.
    pub fn is_stub(&self, id: VnopId) -> bool {
        self.stubs[id.index()]
    }

    pub fn supported(&self) -> impl Iterator<Item = VnopId> + '_ {
        VnopId::ALL
            .iter()
            .copied()
            .filter(move |id| self.supports(*id))
    }
}

impl std::fmt::Debug for VnodeOpTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VnodeOpTable")
            .field("class", &self.class)
            .field("ops", &self.supported().collect::<Vec<_>>())
            .finish()
    }
}

struct VnodeOpTableBuilder {
    table: VnodeOpTable,
}

impl VnodeOpTableBuilder {
    fn op(mut self, id: VnopId, f: VnopFn) -> Self {
        debug_assert!(
            self.table.entries[id.index()].is_none(),
            "duplicate {id:?} entry"
        );
        self.table.entries[id.index()] = Some(f);
        self
    }

    fn ops(mut self, ids: &[VnopId], f: VnopFn) -> Self {
        for id in ids {
            self = self.op(*id, f);
        }
        self
    }

    fn stubs(mut self) -> Self {
        for id in StubPolicy::noop_ops(self.table.class) {
            self = self.op(*id, stub::noop);
            self.table.stubs[id.index()] = true;
        }
        self
    }

    fn build(self) -> VnodeOpTable {
        self.table
    }
}

/// The five class tables of one instance.
#[derive(Debug)]
pub struct VnodeOpTables {
    tables: [VnodeOpTable; 5],
}

impl VnodeOpTables {
    pub fn new() -> Self {
        Self {
            tables: [
                directory_ops(),
                file_ops(),
                symlink_ops(),
                xattr_dir_ops(),
                error_ops(),
            ],
        }
    }

    pub fn get(&self, class: VnodeClass) -> &VnodeOpTable {
        &self.tables[class.index()]
    }
}

impl Default for VnodeOpTables {
    fn default() -> Self {
        Self::new()
    }
}

fn directory_ops() -> VnodeOpTable {
    VnodeOpTable::builder(VnodeClass::Directory)
        .stubs()
        .op(VnopId::Lookup, adapter::lookup)
        .op(VnopId::Create, adapter::create)
        .op(VnopId::Mknod, adapter::mknod)
        .op(VnopId::Open, adapter::open)
        .op(VnopId::Close, adapter::close)
        .op(VnopId::Access, adapter::access)
        .op(VnopId::Getattr, adapter::getattr)
        .op(VnopId::Setattr, adapter::setattr)
        .ops(&[VnopId::Read, VnopId::Write, VnopId::Select], stub::is_dir)
        .op(VnopId::Ioctl, adapter::ioctl)
        .op(VnopId::Fsync, adapter::fsync)
        .op(VnopId::Remove, adapter::remove)
        .op(VnopId::Link, adapter::link)
        .op(VnopId::Rename, adapter::rename)
        .op(VnopId::Mkdir, adapter::mkdir)
        .op(VnopId::Rmdir, adapter::rmdir)
        .op(VnopId::Symlink, adapter::symlink)
        .op(VnopId::Readdir, adapter::readdir)
        .op(VnopId::Pathconf, adapter::pathconf)
        .op(VnopId::Revoke, adapter::revoke)
        .build()
}

fn file_ops() -> VnodeOpTable {
    VnodeOpTable::builder(VnodeClass::RegularFile)
        .stubs()
        .op(VnopId::Open, adapter::open)
        .op(VnopId::Close, adapter::close)
        .op(VnopId::Access, adapter::access)
        .op(VnopId::Getattr, adapter::getattr)
        .op(VnopId::Setattr, adapter::setattr)
        .op(VnopId::Read, adapter::read)
        .op(VnopId::Write, adapter::write)
        .op(VnopId::Ioctl, adapter::ioctl)
        .op(VnopId::Fsync, adapter::fsync)
        .op(VnopId::Pathconf, adapter::pathconf)
        .op(VnopId::Revoke, adapter::revoke)
        .build()
}

fn symlink_ops() -> VnodeOpTable {
    VnodeOpTable::builder(VnodeClass::Symlink)
        .stubs()
        .op(VnopId::Open, adapter::open)
        .op(VnopId::Close, adapter::close)
        .op(VnopId::Access, adapter::access)
        .op(VnopId::Getattr, adapter::getattr)
        .op(VnopId::Setattr, adapter::setattr)
        .op(VnopId::Ioctl, adapter::ioctl)
        .op(VnopId::Readlink, adapter::readlink)
        .op(VnopId::Pathconf, adapter::pathconf)
        .op(VnopId::Revoke, adapter::revoke)
        .build()
}

fn xattr_dir_ops() -> VnodeOpTable {
    VnodeOpTable::builder(VnodeClass::XattrDirectory)
        .stubs()
        .op(VnopId::Lookup, adapter::lookup)
        .op(VnopId::Create, adapter::create)
        .ops(&[VnopId::Mknod, VnopId::Mkdir, VnopId::Symlink], stub::inval)
        .op(VnopId::Open, adapter::open)
        .op(VnopId::Close, adapter::close)
        .op(VnopId::Access, adapter::access)
        .op(VnopId::Getattr, adapter::getattr)
        .op(VnopId::Setattr, adapter::setattr)
        .op(VnopId::Read, adapter::read)
        .op(VnopId::Write, adapter::write)
        .op(VnopId::Ioctl, adapter::ioctl)
        .op(VnopId::Fsync, adapter::fsync)
        .op(VnopId::Remove, adapter::remove)
        .op(VnopId::Link, adapter::link)
        .op(VnopId::Rename, adapter::rename)
        .op(VnopId::Rmdir, adapter::rmdir)
        .op(VnopId::Readdir, adapter::readdir)
        .op(VnopId::Pathconf, adapter::pathconf)
        .build()
}

fn error_ops() -> VnodeOpTable {
    VnodeOpTable::builder(VnodeClass::Error)
        .stubs()
        .op(VnopId::Pathconf, adapter::pathconf)
        .build()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tables_are_indexed_by_class() {
        let tables = VnodeOpTables::new();
        for class in VnodeClass::ALL {
            assert_eq!(tables.get(class).class(), class);
        }
    }

    #[test]
    fn error_node_only_has_lifecycle_ops() {
        let tables = VnodeOpTables::new();
        let ops: Vec<_> = tables.get(VnodeClass::Error).supported().collect();
        assert_eq!(
            ops,
            vec![VnopId::Inactive, VnopId::Reclaim, VnopId::Pathconf]
        );
    }

    #[test]
    fn host_only_ops_are_never_mapped() {
        let tables = VnodeOpTables::new();
        for class in VnodeClass::ALL {
            assert!(!tables.get(class).supports(VnopId::Advlock));
            assert!(!tables.get(class).supports(VnopId::Mnomap));
        }
    }

    #[test]
    fn named_streams_follow_the_feature() {
        let tables = VnodeOpTables::new();
        let file = tables.get(VnodeClass::RegularFile);
        assert_eq!(
            file.supports(VnopId::Getnamedstream),
            cfg!(feature = "named-streams")
        );
        assert!(
            !tables
                .get(VnodeClass::Directory)
                .supports(VnopId::Getnamedstream)
        );
    }

    #[test]
    fn stub_entries_follow_the_policy() {
        let tables = VnodeOpTables::new();
        for class in VnodeClass::ALL {
            let table = tables.get(class);
            for &id in VnopId::ALL {
                assert_eq!(
                    table.is_stub(id),
                    StubPolicy::is_noop(class, id),
                    "{class:?} {id:?}"
                );
            }
        }
    }
}
