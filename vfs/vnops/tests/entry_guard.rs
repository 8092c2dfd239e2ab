mod common;

use std::sync::{Arc, Barrier};
use std::thread;
use std::time::Duration;

use pretty_assertions::assert_eq;
use vfs_vnops::args::*;
use vfs_vnops::types::{FileFlags, IoFlags, Uio};
use vfs_vnops::{EntryStats, Errno, VnopsConfig};

use common::{EngineCall, Fixture, ctx, name};

#[test]
fn release_matches_acquire_on_every_exit_path() {
    let fx = Fixture::new();

    // Success.
    let mut open = OpenArgs {
        vp: fx.file(),
        mode: FileFlags::READ,
        ctx: ctx(),
    };
    assert_eq!(fx.fs.dispatch((&mut open).into()), 0);

    // Engine failure.
    fx.engine.fail("close", Errno::BADF);
    let mut close = CloseArgs {
        vp: fx.file(),
        fflag: FileFlags::READ,
        ctx: ctx(),
    };
    assert_eq!(fx.fs.dispatch((&mut close).into()), libc::EBADF);

    // Validation failure before the engine.
    let mut lookup = LookupArgs {
        dvp: fx.dir(),
        cnp: name(300),
        ctx: ctx(),
        vpp: None,
    };
    assert_eq!(fx.fs.dispatch((&mut lookup).into()), libc::ENAMETOOLONG);

    // Unknown device-control command.
    let mut ioctl = IoctlArgs {
        vp: fx.file(),
        command: 0x1234,
        data: Vec::new(),
        fflag: FileFlags::empty(),
        ctx: ctx(),
    };
    assert_eq!(fx.fs.dispatch((&mut ioctl).into()), libc::ENOTSUP);

    assert_eq!(
        fx.fs.entry_stats(),
        EntryStats {
            acquired: 4,
            released: 4,
            refused: 0,
        }
    );
    assert_eq!(fx.fs.busy(), 0);
}

#[test]
fn teardown_refuses_reads_before_the_engine() {
    let fx = Fixture::new();
    fx.fs.begin_teardown();

    let mut read = ReadArgs {
        vp: fx.file(),
        uio: Uio::for_read(0, 8),
        ioflag: IoFlags::empty(),
        ctx: ctx(),
    };
    assert_eq!(fx.fs.dispatch((&mut read).into()), libc::EIO);
    assert_eq!(read.uio.transferred(), 0);
    assert!(fx.engine.calls().is_empty());
    assert_eq!(fx.fs.busy(), 0);
    assert_eq!(fx.fs.entry_stats().refused, 1);
}

#[test]
fn refused_readdir_still_resets_outputs() {
    let fx = Fixture::new();
    fx.fs.begin_teardown();

    let mut readdir = ReaddirArgs::new(fx.dir(), Uio::for_read(0, 256), ctx());
    readdir.numdirent = 17;
    readdir.eofflag = true;
    assert_eq!(fx.fs.dispatch((&mut readdir).into()), libc::EIO);
    assert_eq!(readdir.numdirent, 0);
    assert!(!readdir.eofflag);
}

#[test]
fn teardown_waits_for_in_flight_operations() {
    let fx = Fixture::new();
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    fx.engine.hold_open(entered.clone(), release.clone());

    let worker = {
        let fs = fx.fs.clone();
        let vp = fx.file();
        thread::spawn(move || {
            let mut open = OpenArgs {
                vp,
                mode: FileFlags::READ | FileFlags::WRITE,
                ctx: ctx(),
            };
            fs.dispatch((&mut open).into())
        })
    };

    entered.wait();
    assert_eq!(fx.fs.busy(), 1);
    fx.fs.begin_teardown();

    // Concurrent read arrives during teardown.
    let mut read = ReadArgs {
        vp: fx.file(),
        uio: Uio::for_read(0, 8),
        ioflag: IoFlags::empty(),
        ctx: ctx(),
    };
    assert_eq!(fx.fs.dispatch((&mut read).into()), libc::EIO);
    assert!(!fx.fs.wait_for_quiescence(Some(Duration::from_millis(20))));

    release.wait();
    assert_eq!(worker.join().expect("worker"), 0);
    assert!(fx.fs.wait_for_quiescence(None));
    assert_eq!(fx.fs.busy(), 0);
    assert_eq!(
        fx.engine.calls(),
        vec![EngineCall::Open(FileFlags::READ | FileFlags::WRITE)]
    );
}

#[test]
fn unmount_times_out_and_stays_mounted() {
    let fx = Fixture::with_config(
        1,
        VnopsConfig {
            teardown_timeout: Some(Duration::from_millis(20)),
            ..VnopsConfig::default()
        },
    );
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    fx.engine.hold_open(entered.clone(), release.clone());

    let worker = {
        let fs = fx.fs.clone();
        let vp = fx.file();
        thread::spawn(move || {
            let mut open = OpenArgs {
                vp,
                mode: FileFlags::READ,
                ctx: ctx(),
            };
            fs.dispatch((&mut open).into())
        })
    };
    entered.wait();

    assert_eq!(fx.fs.unmount(), Err(Errno::BUSY));
    assert!(!fx.fs.is_tearing_down());

    release.wait();
    assert_eq!(worker.join().expect("worker"), 0);

    fx.fs.unmount().expect("unmount");
    assert!(fx.fs.is_tearing_down());
    assert_eq!(
        fx.fs.last_unmount_time(),
        std::time::UNIX_EPOCH + Duration::from_secs(common::CLOCK_SECS)
    );
}

#[test]
fn concurrent_dispatch_balances_the_counter() {
    let fx = Fixture::new();
    let threads = 8;
    let per_thread = 50;
    let start = Arc::new(Barrier::new(threads));

    let workers: Vec<_> = (0..threads)
        .map(|_| {
            let fs = fx.fs.clone();
            let vp = fx.file();
            let start = start.clone();
            thread::spawn(move || {
                start.wait();
                for _ in 0..per_thread {
                    let mut getattr = GetattrArgs {
                        vp,
                        vap: Default::default(),
                        ctx: ctx(),
                    };
                    assert_eq!(fs.dispatch((&mut getattr).into()), 0);
                }
            })
        })
        .collect();

    for worker in workers {
        worker.join().expect("worker");
    }

    let stats = fx.fs.entry_stats();
    assert_eq!(stats.acquired, (threads * per_thread) as u64);
    assert_eq!(stats.released, stats.acquired);
    assert_eq!(fx.fs.busy(), 0);
}

#[test]
fn concurrent_unmounts_do_not_reopen_the_instance() {
    let fx = Fixture::with_config(
        1,
        VnopsConfig {
            teardown_timeout: Some(Duration::from_millis(300)),
            ..VnopsConfig::default()
        },
    );
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    fx.engine.hold_open(entered.clone(), release.clone());

    let worker = {
        let fs = fx.fs.clone();
        let vp = fx.file();
        thread::spawn(move || {
            let mut open = OpenArgs {
                vp,
                mode: FileFlags::READ,
                ctx: ctx(),
            };
            fs.dispatch((&mut open).into())
        })
    };
    entered.wait();

    let first = {
        let fs = fx.fs.clone();
        thread::spawn(move || fs.unmount())
    };
    thread::sleep(Duration::from_millis(60));
    let second = {
        let fs = fx.fs.clone();
        thread::spawn(move || fs.unmount())
    };

    // The first unmount times out while the open is still in the engine.
    assert_eq!(first.join().expect("first unmount"), Err(Errno::BUSY));
    release.wait();
    assert_eq!(worker.join().expect("worker"), 0);

    assert_eq!(second.join().expect("second unmount"), Ok(()));
    assert!(fx.fs.is_tearing_down());

    let mut open = OpenArgs {
        vp: fx.file(),
        mode: FileFlags::READ,
        ctx: ctx(),
    };
    assert_eq!(fx.fs.dispatch((&mut open).into()), libc::EIO);
    assert_eq!(fx.engine.calls().len(), 1);
}

#[test]
fn timed_out_unmount_keeps_explicit_teardown() {
    let fx = Fixture::with_config(
        1,
        VnopsConfig {
            teardown_timeout: Some(Duration::from_millis(20)),
            ..VnopsConfig::default()
        },
    );
    let entered = Arc::new(Barrier::new(2));
    let release = Arc::new(Barrier::new(2));
    fx.engine.hold_open(entered.clone(), release.clone());

    let worker = {
        let fs = fx.fs.clone();
        let vp = fx.file();
        thread::spawn(move || {
            let mut open = OpenArgs {
                vp,
                mode: FileFlags::READ,
                ctx: ctx(),
            };
            fs.dispatch((&mut open).into())
        })
    };
    entered.wait();

    fx.fs.begin_teardown();
    assert_eq!(fx.fs.unmount(), Err(Errno::BUSY));
    assert!(fx.fs.is_tearing_down());

    release.wait();
    assert_eq!(worker.join().expect("worker"), 0);
    assert_eq!(fx.fs.unmount(), Ok(()));
}
