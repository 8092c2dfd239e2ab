//! Per-operation argument translation.
//!
//! Each adapter unwraps its bundle, takes a busy token on the instance,
//! validates what has to be checked before the engine sees it, calls the
//! engine and writes outputs back into the bundle. Statuses are never
//! reclassified on the way out.

use crate::args::{
    AccessArgs, CloseArgs, CreateArgs, FsyncArgs, GetattrArgs, IoctlArgs, LinkArgs, LookupArgs,
    MkdirArgs, MknodArgs, OpenArgs, PathconfArgs, ReadArgs, ReaddirArgs, ReadlinkArgs,
    RemoveArgs, RenameArgs, RevokeArgs, RmdirArgs, SetattrArgs, SymlinkArgs, VnopArgs, WriteArgs,
};
use crate::context::Caller;
use crate::errno::Errno;
use crate::error::{VnopError, VnopResult};
use crate::instance::FsInstance;
use crate::ioctl;
use crate::stub;
use crate::types::{EngineIoFlags, MNT_WAIT, SyncFlags, UioRw};

pub(crate) fn lookup(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<LookupArgs>()?;
    ap.cnp.check_len(fs.config().max_name_len, "vnop.lookup.name")?;

    let vp = fs
        .engine()
        .lookup(ap.dvp, &ap.cnp, Caller::from_context(&ap.ctx))?;
    ap.vpp = Some(vp);
    Ok(())
}

pub(crate) fn create(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<CreateArgs>()?;
    ap.cnp.check_len(fs.config().max_name_len, "vnop.create.name")?;

    let mode = ap.vap.create_mode();
    if let Some(origin) = ap.synthesized_by {
        tracing::trace!(?origin, ?mode, "vnop.create.delegated");
    }
    let vp = fs
        .engine()
        .create(ap.dvp, &ap.cnp, &ap.vap, mode, Caller::from_context(&ap.ctx))?;
    ap.vpp = Some(vp);
    Ok(())
}

/// Node creation is a create with the same name and attributes.
pub(crate) fn mknod(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let ap = args.bundle::<MknodArgs>()?;
    let mut create_args = CreateArgs::from_mknod(ap);
    create(fs, VnopArgs::from(&mut create_args))?;
    ap.vpp = create_args.vpp;
    Ok(())
}

pub(crate) fn open(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<OpenArgs>()?;
    fs.engine()
        .open(ap.vp, ap.mode, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn close(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<CloseArgs>()?;
    fs.engine()
        .close(ap.vp, ap.fflag, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn access(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<AccessArgs>()?;
    fs.engine()
        .access(ap.vp, ap.mode, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn getattr(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<GetattrArgs>()?;
    ap.vap = fs.engine().getattr(ap.vp, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn setattr(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<SetattrArgs>()?;
    fs.engine()
        .setattr(ap.vp, &ap.vap, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn read(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<ReadArgs>()?;
    if ap.uio.rw() != UioRw::Read {
        return Err(VnopError::validation(Errno::INVAL, "vnop.read.direction"));
    }
    let flags = EngineIoFlags::from(ap.ioflag);
    fs.engine()
        .read(ap.vp, &mut ap.uio, flags, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn write(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<WriteArgs>()?;
    if ap.uio.rw() != UioRw::Write {
        return Err(VnopError::validation(Errno::INVAL, "vnop.write.direction"));
    }
    let flags = EngineIoFlags::from(ap.ioflag);
    fs.engine()
        .write(ap.vp, &mut ap.uio, flags, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn ioctl(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<IoctlArgs>()?;
    ioctl::dispatch(fs, ap)
}

pub(crate) fn fsync(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<FsyncArgs>()?;
    if !fs.engine().is_live(ap.vp) {
        tracing::trace!(node = ap.vp.node().get(), "vnop.fsync.reclaimed");
        return Ok(());
    }

    let flags = if ap.waitfor == MNT_WAIT {
        SyncFlags::WAIT
    } else {
        SyncFlags::empty()
    };
    fs.engine()
        .fsync(ap.vp, flags, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn remove(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<RemoveArgs>()?;
    ap.cnp.check_len(fs.config().max_name_len, "vnop.remove.name")?;
    // The removed node is reclaimed once the host drops its last reference.
    fs.engine()
        .remove(ap.dvp, &ap.cnp, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn link(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<LinkArgs>()?;
    if ap.vp.mount() != ap.tdvp.mount() {
        return Err(VnopError::validation(Errno::XDEV, "vnop.link.cross_mount"));
    }
    ap.cnp.check_len(fs.config().max_name_len, "vnop.link.name")?;

    fs.engine()
        .link(ap.tdvp, ap.vp, &ap.cnp, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn rename(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<RenameArgs>()?;
    let max = fs.config().max_name_len;
    ap.fcnp.check_len(max, "vnop.rename.from_name")?;
    ap.tcnp.check_len(max, "vnop.rename.to_name")?;

    fs.engine().rename(
        ap.fdvp,
        &ap.fcnp,
        ap.tdvp,
        &ap.tcnp,
        Caller::from_context(&ap.ctx),
    )?;
    fs.host().cache_purge(ap.tdvp);
    Ok(())
}

pub(crate) fn mkdir(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<MkdirArgs>()?;
    ap.cnp.check_len(fs.config().max_name_len, "vnop.mkdir.name")?;

    let vp = fs
        .engine()
        .mkdir(ap.dvp, &ap.cnp, &ap.vap, Caller::from_context(&ap.ctx))?;
    ap.vpp = Some(vp);
    Ok(())
}

pub(crate) fn rmdir(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<RmdirArgs>()?;
    ap.cnp.check_len(fs.config().max_name_len, "vnop.rmdir.name")?;
    fs.engine()
        .rmdir(ap.dvp, &ap.cnp, Caller::from_context(&ap.ctx))?;
    Ok(())
}

pub(crate) fn symlink(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<SymlinkArgs>()?;
    ap.cnp.check_len(fs.config().max_name_len, "vnop.symlink.name")?;

    let vp = fs.engine().symlink(
        ap.dvp,
        &ap.cnp,
        &ap.vap,
        &ap.target,
        Caller::from_context(&ap.ctx),
    )?;
    ap.vpp = Some(vp);
    Ok(())
}

pub(crate) fn readdir(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let ap = args.bundle::<ReaddirArgs>()?;
    // Outputs are reset even if the call is refused below.
    ap.numdirent = 0;
    ap.eofflag = false;

    let _guard = fs.enter()?;
    let outcome = fs
        .engine()
        .readdir(ap.vp, &mut ap.uio, Caller::from_context(&ap.ctx))?;
    ap.eofflag = outcome.eof;
    ap.numdirent = outcome.entries;
    Ok(())
}

pub(crate) fn readlink(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let _guard = fs.enter()?;
    let ap = args.bundle::<ReadlinkArgs>()?;
    fs.engine()
        .readlink(ap.vp, &mut ap.uio, Caller::from_context(&ap.ctx))?;
    Ok(())
}

/// Only the name limit is answered here; other selectors are no-ops.
pub(crate) fn pathconf(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let ap = args.bundle::<PathconfArgs>()?;
    if ap.name != libc::_PC_NAME_MAX {
        return stub::noop(fs, VnopArgs::from(ap));
    }
    ap.retval = fs.config().max_name_len.saturating_sub(1) as i64;
    Ok(())
}

pub(crate) fn revoke(fs: &FsInstance, args: VnopArgs<'_>) -> VnopResult<()> {
    let ap = args.bundle::<RevokeArgs>()?;
    fs.host().revoke(ap.vp, ap.flags, &ap.ctx)?;
    Ok(())
}
