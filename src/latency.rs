//! Per-call latency distributions for the hot paths.
//!
//! Run with `cargo test --release latency -- --ignored --nocapture`.

use std::time::{Duration, Instant};

use hdrhistogram::Histogram;

use crate::{MethodTable, OwnerRef, Owners, Schedule, Scheduler};

const WARMUP: usize = 10_000;
const ITERATIONS: usize = 100_000;
const FRAME: Duration = Duration::from_micros(16_667);

fn print_histogram(name: &str, hist: &Histogram<u64>) {
    println!("\n=== {} ===", name);
    println!("  count:  {}", hist.len());
    println!("  min:    {} ns", hist.min());
    println!("  max:    {} ns", hist.max());
    println!("  mean:   {:.1} ns", hist.mean());
    println!("  stddev: {:.1} ns", hist.stdev());
    println!("  p50:    {} ns", hist.value_at_quantile(0.50));
    println!("  p90:    {} ns", hist.value_at_quantile(0.90));
    println!("  p99:    {} ns", hist.value_at_quantile(0.99));
    println!("  p99.9:  {} ns", hist.value_at_quantile(0.999));
}

fn interval_for(i: usize) -> Duration {
    Duration::from_millis((i % 50) as u64 * 10 + 10)
}

struct Drone {
    pings: u64,
}

fn drone_scheduler(drones: usize) -> (Scheduler<Drone>, Owners<Drone>, Vec<OwnerRef>) {
    let sched = Scheduler::with_resolver(
        MethodTable::<Drone>::new().with("ping", |drone, _, _| {
            drone.pings += 1;
            Ok(())
        }),
    );
    let mut owners = Owners::with_capacity(drones);
    let refs = (0..drones)
        .map(|_| owners.spawn(Drone { pings: 0 }))
        .collect();
    (sched, owners, refs)
}

// ==================== Register Latency ====================

#[test]
#[ignore]
fn hdr_register_latency() {
    let mut sched: Scheduler = Scheduler::new();
    let mut hist = Histogram::<u64>::new(3).unwrap();

    for i in 0..WARMUP {
        let handle = sched
            .register_callback(|_| Ok(()), Schedule::every(interval_for(i)))
            .unwrap();
        sched.unregister(handle);
    }

    for i in 0..ITERATIONS {
        let start = Instant::now();
        let handle = sched
            .register_callback(|_| Ok(()), Schedule::every(interval_for(i)))
            .unwrap();
        let elapsed = start.elapsed().as_nanos() as u64;

        hist.record(elapsed).unwrap();
        sched.unregister(handle);
    }

    print_histogram("Register Latency", &hist);
}

#[test]
#[ignore]
fn hdr_bound_call_latency() {
    let (mut sched, owners, refs) = drone_scheduler(1);
    let mut hist = Histogram::<u64>::new(3).unwrap();

    for i in 0..ITERATIONS {
        let start = Instant::now();
        let handle = sched
            .register_bound_call(
                &owners,
                refs[0],
                "ping",
                vec![],
                Schedule::every(interval_for(i)),
            )
            .unwrap();
        let elapsed = start.elapsed().as_nanos() as u64;

        hist.record(elapsed).unwrap();
        sched.unregister(handle);
    }

    print_histogram("Bound Call Register Latency", &hist);
}

// ==================== Unregister Latency ====================

#[test]
#[ignore]
fn hdr_unregister_latency() {
    let mut sched: Scheduler = Scheduler::new();
    let mut hist = Histogram::<u64>::new(3).unwrap();

    // Background population so removal searches a realistic group
    for i in 0..1_000 {
        sched
            .register_callback(|_| Ok(()), Schedule::every(interval_for(i)))
            .unwrap();
    }

    for i in 0..ITERATIONS {
        let handle = sched
            .register_callback(|_| Ok(()), Schedule::every(interval_for(i)))
            .unwrap();

        let start = Instant::now();
        sched.unregister(handle);
        let elapsed = start.elapsed().as_nanos() as u64;

        hist.record(elapsed).unwrap();
    }

    print_histogram("Unregister Latency", &hist);
}

// ==================== Advance Latency ====================

#[test]
#[ignore]
fn hdr_advance_idle_latency() {
    let (mut sched, mut owners, refs) = drone_scheduler(1_000);
    for (i, drone) in refs.iter().enumerate() {
        let schedule = Schedule::every(Duration::from_secs(3600) + interval_for(i));
        sched
            .register_bound_call(&owners, *drone, "ping", vec![], schedule)
            .unwrap();
    }
    let mut hist = Histogram::<u64>::new(3).unwrap();

    for _ in 0..WARMUP {
        sched.advance(Duration::ZERO, &mut owners).unwrap();
    }

    for _ in 0..ITERATIONS {
        let start = Instant::now();
        sched.advance(Duration::ZERO, &mut owners).unwrap();
        let elapsed = start.elapsed().as_nanos() as u64;

        hist.record(elapsed).unwrap();
    }

    print_histogram("Advance Latency (1000 idle)", &hist);
}

#[test]
#[ignore]
fn hdr_advance_frame_latency() {
    let (mut sched, mut owners, refs) = drone_scheduler(1_000);
    for (i, drone) in refs.iter().enumerate() {
        sched
            .register_bound_call(
                &owners,
                *drone,
                "ping",
                vec![],
                Schedule::every(interval_for(i)),
            )
            .unwrap();
    }
    let mut fired = 0u64;
    let mut hist = Histogram::<u64>::new(3).unwrap();

    for _ in 0..ITERATIONS / 10 {
        let start = Instant::now();
        let count = sched.advance(FRAME, &mut owners).unwrap();
        let elapsed = start.elapsed().as_nanos() as u64;

        hist.record(elapsed).unwrap();
        fired += count as u64;
    }

    let pings: u64 = owners.iter().map(|(_, drone)| drone.pings).sum();
    assert_eq!(pings, fired);
    print_histogram("Advance Latency (1000 drones, 60 fps)", &hist);
}
