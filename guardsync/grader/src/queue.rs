use std::thread;
use std::time::Duration;

fn settle() {
    thread::sleep(Duration::from_millis(20));
}

pub mod unbounded {
    use guardsync::UnboundedQueue;
    use std::sync::Arc;
    use std::thread;

    pub fn fifo() {
        let q = UnboundedQueue::new();
        for i in 1..=3 {
            q.push(i);
        }
        assert_eq!(q.len(), 3);
        assert_eq!(q.pop(), Some(1));
        assert_eq!(q.pop(), Some(2));
        assert_eq!(q.pop(), Some(3));
        assert!(q.is_empty());
    }

    pub fn empty_pop() {
        let q = UnboundedQueue::<usize>::new();
        assert_eq!(q.pop(), None);
        q.push(7);
        assert_eq!(q.pop(), Some(7));
        assert_eq!(q.pop(), None);
    }

    pub fn producers() {
        const PRODUCERS: usize = 4;
        const ITEMS: usize = 500;
        let q = Arc::new(UnboundedQueue::new());

        let handles: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let q = q.clone();
                thread::spawn(move || {
                    for i in 0..ITEMS {
                        q.push((p, i));
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(q.len(), PRODUCERS * ITEMS);
        let mut next = [0; PRODUCERS];
        while let Some((p, i)) = q.pop() {
            assert_eq!(i, next[p], "items of producer {p} were reordered");
            next[p] += 1;
        }
        assert_eq!(next, [ITEMS; PRODUCERS]);
    }
}

pub mod bounded {
    use super::settle;
    use guardsync::{BoundedQueue, Error};
    use std::sync::{
        Arc,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    };
    use std::thread;

    pub fn fifo() {
        let q = BoundedQueue::new(3).unwrap();
        q.push('a');
        q.push('b');
        q.push('c');
        assert!(q.is_full());
        assert_eq!(q.pop(), 'a');
        assert_eq!(q.pop(), 'b');
        assert_eq!(q.pop(), 'c');
        assert!(q.is_empty());
    }

    pub fn zero_capacity() {
        assert_eq!(BoundedQueue::<usize>::new(0).err(), Some(Error::ZeroCapacity));
        assert_eq!(BoundedQueue::<usize>::new(1).unwrap().capacity(), 1);
    }

    pub fn try_pop_empty() {
        let q = BoundedQueue::<usize>::new(2).unwrap();
        for _ in 0..10 {
            assert_eq!(q.try_pop(), None);
        }
        // Failed polls must not leak free slots: the queue still holds two.
        q.push(1);
        q.push(2);
        assert_eq!(q.try_push(3), Err(3));
        assert_eq!(q.len(), 2);
    }

    pub fn backpressure() {
        let q = Arc::new(BoundedQueue::new(2).unwrap());
        q.push(1);
        q.push(2);

        let pushed = Arc::new(AtomicBool::new(false));
        let producer = {
            let (q, pushed) = (q.clone(), pushed.clone());
            thread::Builder::new()
                .name("producer".into())
                .spawn(move || {
                    q.push(3);
                    pushed.store(true, Ordering::SeqCst);
                })
                .unwrap()
        };

        settle();
        assert!(!pushed.load(Ordering::SeqCst), "push into a full queue must block");
        assert_eq!(q.len(), 2);

        assert_eq!(q.pop(), 1);
        producer.join().unwrap();
        assert!(pushed.load(Ordering::SeqCst));
        assert_eq!(q.pop(), 2);
        assert_eq!(q.pop(), 3);

        let consumer = {
            let q = q.clone();
            thread::spawn(move || q.pop())
        };
        settle();
        assert!(!consumer.is_finished(), "pop from an empty queue must block");
        q.push(4);
        assert_eq!(consumer.join().unwrap(), 4);
    }

    pub fn try_pop_accounting() {
        let q = Arc::new(BoundedQueue::new(1).unwrap());
        q.push(10);
        assert_eq!(q.try_pop(), Some(10));

        // The item taken by `try_pop` must not be counted as still available.
        let consumer = {
            let q = q.clone();
            thread::spawn(move || q.pop())
        };
        settle();
        assert!(!consumer.is_finished());
        q.push(20);
        assert_eq!(consumer.join().unwrap(), 20);
        assert!(q.is_empty());
    }

    pub fn capacity_invariant() {
        const CAPACITY: usize = 3;
        const PRODUCERS: usize = 3;
        const ITEMS: usize = 300;
        let q = Arc::new(BoundedQueue::new(CAPACITY).unwrap());
        let stop = Arc::new(AtomicBool::new(false));
        let max_len = Arc::new(AtomicUsize::new(0));

        let sampler = {
            let (q, stop, max_len) = (q.clone(), stop.clone(), max_len.clone());
            thread::spawn(move || {
                while !stop.load(Ordering::SeqCst) {
                    max_len.fetch_max(q.len(), Ordering::SeqCst);
                    thread::yield_now();
                }
            })
        };
        let producers: Vec<_> = (0..PRODUCERS)
            .map(|p| {
                let q = q.clone();
                thread::spawn(move || {
                    for i in 0..ITEMS {
                        q.push(p * ITEMS + i);
                    }
                })
            })
            .collect();

        let mut consumed: Vec<_> = (0..PRODUCERS * ITEMS).map(|_| q.pop()).collect();
        for producer in producers {
            producer.join().unwrap();
        }
        stop.store(true, Ordering::SeqCst);
        sampler.join().unwrap();

        consumed.sort_unstable();
        assert_eq!(consumed, (0..PRODUCERS * ITEMS).collect::<Vec<_>>());
        assert!(max_len.load(Ordering::SeqCst) <= CAPACITY);
        assert!(q.is_empty());
    }
}

pub mod channel {
    use guardsync::channel;
    use std::thread;

    fn spsc(capacity: usize) {
        let (tx, rx) = channel(capacity).unwrap();
        let producer = thread::Builder::new()
            .name(format!("producer-{capacity}"))
            .spawn(move || {
                for i in 1..=5 {
                    tx.send(i);
                }
            })
            .unwrap();
        let consumer = thread::Builder::new()
            .name(format!("consumer-{capacity}"))
            .spawn(move || {
                let mut got = Vec::new();
                for _ in 0..5 {
                    got.push(rx.receive());
                }
                got
            })
            .unwrap();
        producer.join().unwrap();
        assert_eq!(consumer.join().unwrap(), [1, 2, 3, 4, 5]);
    }

    pub fn spsc_capacity_1() {
        spsc(1);
    }

    pub fn spsc_any_capacity() {
        for capacity in [2, 3, 4, 8, 64] {
            spsc(capacity);
        }
    }

    pub fn try_receive() {
        let (tx, rx) = channel::<i32>(2).unwrap();
        assert_eq!(rx.try_receive(), None);
        let _ = &tx << 1 << 2;
        assert_eq!(tx.try_send(3), Err(3));

        let mut a = 0;
        let _ = &rx >> &mut a;
        assert_eq!(a, 1);
        let mut b: Option<i32> = None;
        let _ = &rx >> &mut b;
        assert_eq!(b, Some(2));
        let _ = &rx >> &mut b;
        assert_eq!(b, None);
        assert_eq!(rx.try_receive(), None);
        assert!(rx.is_empty());
    }
}
