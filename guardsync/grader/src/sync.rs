use crossbeam_utils::Backoff;
use std::thread;
use std::time::Duration;

fn spin_until(cond: impl Fn() -> bool) {
    let backoff = Backoff::new();
    while !cond() {
        backoff.snooze();
    }
}

/// Long enough for every spawned thread to reach its blocking point.
fn settle() {
    thread::sleep(Duration::from_millis(20));
}

pub mod guarded {
    use super::{settle, spin_until};
    use guardsync::GuardedValue;
    use std::sync::{
        Arc,
        atomic::{AtomicUsize, Ordering},
    };
    use std::thread;

    pub fn smoke() {
        const LENGTH: usize = 64;
        let output = Arc::new(GuardedValue::new(Vec::new()));
        let ready = Arc::new(GuardedValue::new(0));

        let workers: Vec<_> = (0..LENGTH)
            .map(|i| {
                let (output, ready) = (output.clone(), ready.clone());
                thread::spawn(move || {
                    ready.mutate_then_notify_all(|n| *n += 1);
                    ready.wait(|n| *n == LENGTH);
                    output.mutate(|v| v.push(i));
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        let mut output = output.query(Vec::clone);
        output.sort();
        assert_eq!(output, (0..LENGTH).collect::<Vec<_>>());
    }

    const MAX: usize = 2;
    struct BufferInner {
        item: [usize; MAX],
        front: usize,
        len: usize,
    }

    impl BufferInner {
        fn is_full(&self) -> bool {
            self.len == MAX
        }
        fn is_empty(&self) -> bool {
            self.len == 0
        }
    }

    /// Ring buffer with both waiting sides on one condition variable, so
    /// every state change has to wake all waiters.
    struct Buffer {
        inner: GuardedValue<BufferInner>,
    }

    impl Buffer {
        fn put(&self, val: usize) {
            self.inner.wait_then_mutate(
                |b| !b.is_full(),
                |b| {
                    let tail = (b.front + b.len) % MAX;
                    b.item[tail] = val;
                    b.len += 1;
                },
            );
            self.inner.notify_all();
        }

        fn get(&self) -> usize {
            let item = self.inner.wait_then_mutate(
                |b| !b.is_empty(),
                |b| {
                    let item = b.item[b.front];
                    b.front = (b.front + 1) % MAX;
                    b.len -= 1;
                    item
                },
            );
            self.inner.notify_all();
            item
        }
    }

    pub fn bounded_buffer() {
        const CONSUMERS: usize = 18;
        let buffer = Arc::new(Buffer {
            inner: GuardedValue::new(BufferInner {
                item: [0; MAX],
                front: 0,
                len: 0,
            }),
        });
        let waiters = Arc::new(AtomicUsize::new(0));
        let output = Arc::new(GuardedValue::new(Vec::new()));

        let consumers: Vec<_> = (0..CONSUMERS)
            .map(|_| {
                let (buffer, waiters, output) = (buffer.clone(), waiters.clone(), output.clone());
                thread::Builder::new()
                    .name("consumer".into())
                    .spawn(move || {
                        waiters.fetch_add(1, Ordering::SeqCst);
                        let d = buffer.get();
                        output.mutate(|v| v.push(d));
                    })
                    .unwrap()
            })
            .collect();
        spin_until(|| waiters.load(Ordering::SeqCst) == CONSUMERS);
        settle();

        let producer = {
            let buffer = buffer.clone();
            thread::Builder::new()
                .name("producer".into())
                .spawn(move || {
                    for i in 0..CONSUMERS {
                        buffer.put(i);
                    }
                })
                .unwrap()
        };

        for consumer in consumers {
            consumer.join().unwrap();
        }
        producer.join().unwrap();

        let mut output = output.query(Vec::clone);
        output.sort();
        assert_eq!(output, (0..CONSUMERS).collect::<Vec<_>>());
        assert!(buffer.inner.query(BufferInner::is_empty));
    }

    pub fn flag_broadcast() {
        const WAITERS: usize = 8;
        let flag = Arc::new(GuardedValue::new(false));
        let woken = Arc::new(AtomicUsize::new(0));

        let waiters: Vec<_> = (0..WAITERS)
            .map(|_| {
                let (flag, woken) = (flag.clone(), woken.clone());
                thread::spawn(move || {
                    flag.wait_true();
                    woken.fetch_add(1, Ordering::SeqCst);
                })
            })
            .collect();

        settle();
        assert_eq!(woken.load(Ordering::SeqCst), 0);
        // A notification without a state change releases nobody.
        flag.notify_all();
        settle();
        assert_eq!(woken.load(Ordering::SeqCst), 0);

        flag.set_true_notify_all();
        for waiter in waiters {
            waiter.join().unwrap();
        }
        assert_eq!(woken.load(Ordering::SeqCst), WAITERS);
        assert!(flag.is_set());
    }
}

pub mod monitor {
    use super::{settle, spin_until};
    use guardsync::Monitor;
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };
    use std::thread;

    pub fn smoke() {
        const LENGTH: usize = 64;
        let output = Arc::new(Monitor::new(Vec::new()));
        let counter = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..LENGTH)
            .map(|i| {
                let (output, counter) = (output.clone(), counter.clone());
                thread::spawn(move || {
                    counter.fetch_add(1, Ordering::SeqCst);
                    let mut d = output.lock();
                    spin_until(|| counter.load(Ordering::SeqCst) == LENGTH);
                    d.push(i);
                })
            })
            .collect();
        for worker in workers {
            worker.join().unwrap();
        }

        output.apply(|output| {
            output.sort();
            assert_eq!(*output, (0..LENGTH).collect::<Vec<_>>());
        });
    }

    pub fn parking() {
        let monitor = Arc::new(Monitor::new(0));
        let guard = monitor.lock();
        let thread_spawned = Arc::new(AtomicBool::new(false));

        let be_parked = {
            let (thread_spawned, monitor) = (thread_spawned.clone(), monitor.clone());
            thread::Builder::new()
                .name("blockee".into())
                .spawn(move || {
                    thread_spawned.store(true, Ordering::SeqCst);
                    monitor.apply(|n| *n += 1);
                })
                .unwrap()
        };

        spin_until(|| thread_spawned.load(Ordering::SeqCst));
        settle();

        assert!(
            !be_parked.is_finished(),
            "A thread blocked by a held monitor must not make progress"
        );
        assert_eq!(*guard, 0);

        drop(guard);
        be_parked.join().unwrap();
        assert_eq!(monitor.apply(|n| *n), 1);
    }

    pub fn unwinding() {
        let monitor = Arc::new(Monitor::new(Vec::<usize>::new()));

        let panicked = {
            let monitor = monitor.clone();
            thread::Builder::new()
                .name("panicker".into())
                .spawn(move || {
                    monitor.apply(|v| {
                        v.push(1);
                        panic!("expected panic inside the monitor");
                    })
                })
                .unwrap()
                .join()
        };
        assert!(panicked.is_err());

        // The lock was released during unwinding and the partial write stays.
        let monitor = Arc::try_unwrap(monitor).unwrap();
        monitor.apply(|v| v.push(2));
        assert_eq!(monitor.into_inner(), [1, 2]);
    }
}

pub mod semaphore {
    use super::{settle, spin_until};
    use guardsync::{ExclusiveSemaphore, Monitor, Semaphore, SharedSemaphore};
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicU32, AtomicUsize, Ordering},
    };
    use std::thread;

    pub fn sema_0() {
        let sema = Arc::new(Semaphore::new(0));
        let is_thread_active = Arc::new(AtomicBool::new(false));
        let is_woken_up = Arc::new(AtomicBool::new(false));

        let thread = {
            let (sema, is_thread_active, is_woken_up) =
                (sema.clone(), is_thread_active.clone(), is_woken_up.clone());

            thread::Builder::new()
                .name("worker".into())
                .spawn(move || {
                    is_thread_active.store(true, Ordering::SeqCst);
                    sema.wait();
                    is_woken_up.store(true, Ordering::SeqCst);
                })
                .unwrap()
        };

        spin_until(|| is_thread_active.load(Ordering::SeqCst));
        settle();

        assert!(!is_woken_up.load(Ordering::SeqCst));

        sema.signal();
        thread.join().unwrap();

        assert!(is_woken_up.load(Ordering::SeqCst));
        assert_eq!(sema.available_permits(), 0);
    }

    /// Starts `COUNT` threads that each take one permit of a semaphore created
    /// with `initial` permits, then hands out `step` permits at a time and
    /// checks that exactly that many threads get through per step.
    fn release_in_steps(initial: usize, step: u32) {
        const COUNT: u32 = 16;
        let sema = Arc::new(Semaphore::new(initial));
        let ready_counter = Arc::new(AtomicU32::new(0));
        let counter = Arc::new(AtomicU32::new(0));

        for i in 0..COUNT {
            let (sema, ready_counter, counter) =
                (sema.clone(), ready_counter.clone(), counter.clone());

            thread::Builder::new()
                .name(format!("t{i}"))
                .spawn(move || {
                    ready_counter.fetch_add(1, Ordering::SeqCst);
                    sema.acquire().forget();
                    counter.fetch_add(1, Ordering::SeqCst);
                })
                .unwrap();
        }

        spin_until(|| ready_counter.load(Ordering::SeqCst) >= COUNT);
        let mut expected_cnt = initial as u32;
        spin_until(|| counter.load(Ordering::SeqCst) >= expected_cnt);
        settle();
        assert_eq!(counter.load(Ordering::SeqCst), expected_cnt);

        while counter.load(Ordering::SeqCst) < COUNT {
            expected_cnt += step;
            for _ in 0..step {
                sema.signal();
            }
            spin_until(|| counter.load(Ordering::SeqCst) >= expected_cnt);
            // Extra time for a thread that got through without a permit.
            settle();

            assert_eq!(counter.load(Ordering::SeqCst), expected_cnt);
        }
        assert_eq!(sema.available_permits(), 0);
    }

    pub fn sema_1() {
        release_in_steps(1, 1);
    }

    pub fn sema_2() {
        release_in_steps(2, 2);
    }

    pub fn exec_order() {
        const COUNT: usize = 3;

        let counter = Arc::new(AtomicUsize::new(0));
        let counter2 = Arc::new(AtomicUsize::new(0));
        let sema = Arc::new(Semaphore::new(0));

        let supports: Vec<_> = (0..COUNT)
            .map(|i| {
                let (counter, counter2, sema) = (counter.clone(), counter2.clone(), sema.clone());
                thread::Builder::new()
                    .name(format!("support_{i}"))
                    .spawn(move || {
                        counter2.fetch_add(1, Ordering::SeqCst);
                        let _guard = sema.acquire();
                        counter.fetch_add(1, Ordering::SeqCst);
                    })
                    .unwrap()
            })
            .collect();

        spin_until(|| counter2.load(Ordering::SeqCst) == COUNT);
        settle();
        assert_eq!(counter.load(Ordering::SeqCst), 0);

        // Each support thread hands its permit back on exit, so one release
        // lets all of them through in turn.
        sema.v();
        for support in supports {
            support.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), COUNT);
        assert_eq!(sema.available_permits(), 1);
    }

    pub fn n_permits() {
        const COUNT: usize = 5;
        const PERMITS: usize = 3;

        let counter = Arc::new(AtomicUsize::new(0));
        let counter2 = Arc::new(AtomicUsize::new(0));
        let sema = Arc::new(Semaphore::new(PERMITS));
        let lock = Arc::new(Monitor::new(()));

        let guard = lock.lock();

        let supports: Vec<_> = (0..COUNT)
            .map(|i| {
                let (counter, counter2, sema, lock) =
                    (counter.clone(), counter2.clone(), sema.clone(), lock.clone());
                thread::Builder::new()
                    .name(format!("support_{i}"))
                    .spawn(move || {
                        counter2.fetch_add(1, Ordering::SeqCst);
                        let _guard = sema.acquire();
                        counter.fetch_add(1, Ordering::SeqCst);
                        lock.apply(|_| ());
                    })
                    .unwrap()
            })
            .collect();

        spin_until(|| counter2.load(Ordering::SeqCst) == COUNT);
        spin_until(|| counter.load(Ordering::SeqCst) >= PERMITS);
        settle();
        assert_eq!(counter.load(Ordering::SeqCst), PERMITS);
        drop(guard);

        for support in supports {
            support.join().unwrap();
        }
        assert_eq!(counter.load(Ordering::SeqCst), COUNT);
        assert_eq!(sema.available_permits(), PERMITS);
    }

    pub fn shared_handles() {
        const THREADS: usize = 8;
        const ROUNDS: usize = 200;
        let sema = SharedSemaphore::new(1);
        let inside = Arc::new(AtomicUsize::new(0));

        let workers: Vec<_> = (0..THREADS)
            .map(|_| {
                let (sema, inside) = (sema.clone(), inside.clone());
                thread::spawn(move || {
                    for _ in 0..ROUNDS {
                        let _permit = sema.acquire();
                        assert_eq!(inside.fetch_add(1, Ordering::SeqCst), 0);
                        inside.fetch_sub(1, Ordering::SeqCst);
                    }
                    sema
                })
            })
            .collect();

        for worker in workers {
            let handle = worker.join().unwrap();
            assert!(SharedSemaphore::ptr_eq(&sema, &handle));
        }
        assert_eq!(sema.available_permits(), 1);
        assert!(!SharedSemaphore::ptr_eq(&sema, &SharedSemaphore::new(1)));
    }

    pub fn exclusive_handle() {
        let sema = ExclusiveSemaphore::new(2);
        let sema = thread::spawn(move || {
            sema.p();
            sema.enter();
            assert!(!sema.try_p());
            sema.exit();
            sema
        })
        .join()
        .unwrap();

        assert_eq!(sema.available_permits(), 1);
        assert!(sema.try_p());
        let inner = sema.into_inner();
        assert_eq!(inner.available_permits(), 0);
    }
}
