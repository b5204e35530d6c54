use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::{Duration, Instant};
use taskwell::{max_threads, Error, PoolState, Priority, ThreadPool};

fn init_logging() {
    let _ = env_logger::builder().is_test(true).try_init();
}

// Clamp to the machine so capacity checks never trip the tests themselves.
fn pool_with(threads: usize) -> ThreadPool {
    ThreadPool::with_threads(threads.min(max_threads())).unwrap()
}

#[test]
fn priority_order_on_single_worker() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();

    // Pause so all three tasks are resident before any is dequeued.
    pool.pause().unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for priority in [3, 1, 2] {
        let order = Arc::clone(&order);
        pool.execute_with_priority(move || order.lock().push(priority), Priority::new(priority))
            .unwrap();
    }

    pool.resume().unwrap();
    pool.finish(true).unwrap();

    assert_eq!(*order.lock(), vec![3, 2, 1]);
}

#[test]
fn equal_priority_runs_in_submission_order() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();
    pool.pause().unwrap();

    let order = Arc::new(Mutex::new(Vec::new()));
    for tag in 0..10 {
        let order = Arc::clone(&order);
        pool.execute_with_priority(move || order.lock().push(tag), Priority::new(5))
            .unwrap();
    }

    pool.resume().unwrap();
    pool.finish(true).unwrap();

    assert_eq!(*order.lock(), (0..10).collect::<Vec<_>>());
}

#[test]
fn no_task_is_lost_on_draining_finish() {
    init_logging();
    let pool = pool_with(4);
    let counter = Arc::new(AtomicUsize::new(0));

    for _ in 0..200 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    pool.finish(true).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 200);
}

#[test]
fn pause_takes_effect_at_task_boundaries() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();

    let started = Arc::new(AtomicBool::new(false));
    let completed = Arc::new(AtomicBool::new(false));
    {
        let started = Arc::clone(&started);
        let completed = Arc::clone(&completed);
        pool.execute(move || {
            started.store(true, Ordering::SeqCst);
            thread::sleep(Duration::from_millis(200));
            completed.store(true, Ordering::SeqCst);
        })
        .unwrap();
    }

    while !started.load(Ordering::SeqCst) {
        thread::yield_now();
    }

    // Pause returns while the long task is still in flight.
    pool.pause().unwrap();
    assert_eq!(pool.state(), PoolState::Paused);

    let probe = Arc::new(AtomicBool::new(false));
    {
        let probe = Arc::clone(&probe);
        pool.execute(move || probe.store(true, Ordering::SeqCst)).unwrap();
    }

    thread::sleep(Duration::from_millis(400));
    assert!(
        completed.load(Ordering::SeqCst),
        "in-flight task must complete during pause"
    );
    assert!(
        !probe.load(Ordering::SeqCst),
        "no new task may start while paused"
    );

    pool.resume().unwrap();
    pool.finish(true).unwrap();
    assert!(probe.load(Ordering::SeqCst));
}

#[test]
fn fast_finish_discards_queued_tasks() {
    init_logging();
    let pool = pool_with(2);
    pool.pause().unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..8 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    let start = Instant::now();
    pool.finish(false).unwrap();

    assert_eq!(counter.load(Ordering::SeqCst), 0, "discarded tasks must never run");
    assert!(start.elapsed() < Duration::from_secs(1), "fast finish must be prompt");
}

#[test]
fn resize_is_idempotent() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();
    let target = 2.min(max_threads());

    pool.set_thread_count(target).unwrap();
    assert_eq!(pool.size(), target);
    pool.set_thread_count(target).unwrap();
    assert_eq!(pool.size(), target);

    pool.finish(true).unwrap();
}

#[test]
fn pool_keeps_working_across_resizes() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let submit = |n: usize| {
        for _ in 0..n {
            let counter = Arc::clone(&counter);
            pool.execute(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            })
            .unwrap();
        }
    };

    submit(20);
    pool.set_thread_count(2.min(max_threads())).unwrap();
    submit(20);
    pool.set_thread_count(1).unwrap();
    assert_eq!(pool.size(), 1);
    submit(20);

    pool.finish(true).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 60);
}

#[test]
fn panicking_task_does_not_kill_its_worker() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();
    let after = Arc::new(AtomicBool::new(false));

    pool.execute(|| panic!("intentional test panic")).unwrap();
    {
        let after = Arc::clone(&after);
        pool.execute(move || after.store(true, Ordering::SeqCst)).unwrap();
    }

    pool.finish(true).unwrap();
    assert!(
        after.load(Ordering::SeqCst),
        "worker must survive a panicking task and run the next one"
    );
}

#[test]
fn finish_on_paused_pool_still_drains() {
    init_logging();
    let pool = pool_with(2);
    pool.pause().unwrap();

    let counter = Arc::new(AtomicUsize::new(0));
    for _ in 0..10 {
        let counter = Arc::clone(&counter);
        pool.execute(move || {
            counter.fetch_add(1, Ordering::SeqCst);
        })
        .unwrap();
    }

    // finish forces the pool back to running so workers can drain.
    pool.finish(true).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 10);
}

#[test]
fn finish_on_empty_pool_returns_immediately() {
    init_logging();
    let pool = pool_with(2);
    let start = Instant::now();
    pool.finish(true).unwrap();
    assert!(start.elapsed() < Duration::from_secs(1));
}

#[test]
fn submissions_race_cleanly_with_workers() {
    init_logging();
    let pool = Arc::new(pool_with(4));
    let counter = Arc::new(AtomicUsize::new(0));

    let submitters: Vec<_> = (0..4i32)
        .map(|t| {
            let pool = Arc::clone(&pool);
            let counter = Arc::clone(&counter);
            thread::spawn(move || {
                for i in 0..50i32 {
                    let counter = Arc::clone(&counter);
                    pool.execute_with_priority(
                        move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        },
                        Priority::new((t * 50 + i) % 7),
                    )
                    .unwrap();
                }
            })
        })
        .collect();

    for submitter in submitters {
        submitter.join().unwrap();
    }

    pool.finish(true).unwrap();
    assert_eq!(counter.load(Ordering::SeqCst), 200);
}

#[test]
fn finish_terminates_after_racing_pushers() {
    init_logging();

    // Pushers racing a draining worker must leave the queue-empty signal
    // intact; a drift in that accounting shows up here as a finish(true)
    // that never returns.
    for round in 0..20 {
        let pool = Arc::new(ThreadPool::with_threads(1).unwrap());
        let counter = Arc::new(AtomicUsize::new(0));

        let pushers: Vec<_> = (0..3)
            .map(|_| {
                let pool = Arc::clone(&pool);
                let counter = Arc::clone(&counter);
                thread::spawn(move || {
                    for _ in 0..25 {
                        let counter = Arc::clone(&counter);
                        pool.execute(move || {
                            counter.fetch_add(1, Ordering::SeqCst);
                        })
                        .unwrap();
                    }
                })
            })
            .collect();

        for pusher in pushers {
            pusher.join().unwrap();
        }

        pool.finish(true).unwrap();
        assert_eq!(counter.load(Ordering::SeqCst), 75, "round {}", round);
    }
}

#[test]
fn push_after_finish_is_rejected() {
    init_logging();
    let pool = ThreadPool::with_threads(1).unwrap();
    pool.finish(true).unwrap();
    assert!(matches!(pool.execute(|| {}), Err(Error::Finished)));
    assert!(matches!(pool.finish(false), Err(Error::Finished)));
}
