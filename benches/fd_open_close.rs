/* Benchmarks for path_open / fd_close through a preopen.  In general, I'm not
 * doing results checking beyond making sure the calls did not fail. */

use criterion::{criterion_group, criterion_main, Criterion};

use rustwasi::safewasi::cage::*;
use rustwasi::safewasi::syscalls::fs_constants::*;

use std::ffi::CString;


pub fn run_benchmark(c: &mut Criterion) {
    let dir = tempfile::tempdir().unwrap();
    let options = CageOptions::default().add_preopen("/sandbox", dir.path().to_str().unwrap());
    let mut cage = Cage::new(&options).unwrap();
    let rights = RIGHT_FD_READ | RIGHT_FD_WRITE | RIGHT_FD_SEEK;

    // --- COMPARING open / close CALLS ACROSS the sandbox + Native OS kernel ---
    let mut group = c.benchmark_group("Compare fs:open+close");

    group.plot_config(
        criterion::PlotConfiguration::default().summary_scale(criterion::AxisScale::Linear),
    );

    group.bench_function("TF01: sandbox path_open+fd_close", |b| {
        b.iter(|| {
            let fd = cage
                .path_open_syscall(3, 0, "foo", OFLAGS_CREAT | OFLAGS_TRUNC, rights, 0, 0)
                .unwrap();
            assert!(fd > 3);
            cage.fd_close_syscall(fd).unwrap();
        })
    });

    group.bench_function("TF02: sandbox path_open+fd_close following links", |b| {
        b.iter(|| {
            let fd = cage
                .path_open_syscall(3, LOOKUP_SYMLINK_FOLLOW, "foo", OFLAGS_CREAT, rights, 0, 0)
                .unwrap();
            cage.fd_close_syscall(fd).unwrap();
        })
    });

    // For comparison let's time the native OS...
    let native = CString::new(dir.path().join("foo").to_str().unwrap()).unwrap();
    group.bench_function("TF01: Native OS kernel open+close", |b| {
        b.iter(|| unsafe {
            let fd = libc::open(native.as_ptr(), O_CREAT | O_TRUNC | O_RDWR, 0o666);
            assert!(fd > 2);
            assert_eq!(libc::close(fd), 0);
        })
    });
    group.finish();
}

criterion_group!(name=benches;
                 // Add the global settings here so we don't type it everywhere
                 config=global_criterion_settings::get_criterion();
                 targets=run_benchmark);
criterion_main!(benches);
