// CLASSIFICATION: COMMUNITY
// Filename: guard.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Reader-preference reader/writer guard attached to every file.
//!
//! The guard is built from two primitives: a short-held count lock that
//! protects the reader count, and an access lock held by a writer for its
//! whole session or by the reader group while at least one reader is
//! active. The first reader in takes the access lock, the last reader out
//! releases it, so the releasing thread may differ from the acquiring one.
//!
//! Readers never wait on other readers. A writer waiting behind a steady
//! stream of overlapping readers can starve; this is accepted.

use std::sync::{Condvar, Mutex, MutexGuard};

/// Binary lock that may be released by a thread other than its acquirer.
#[derive(Debug, Default)]
struct AccessLock {
    held: Mutex<bool>,
    released: Condvar,
}

impl AccessLock {
    fn acquire(&self) {
        let mut held = lock(&self.held);
        while *held {
            held = match self.released.wait(held) {
                Ok(guard) => guard,
                Err(poisoned) => poisoned.into_inner(),
            };
        }
        *held = true;
    }

    fn release(&self) {
        let mut held = lock(&self.held);
        *held = false;
        drop(held);
        self.released.notify_one();
    }

    fn is_held(&self) -> bool {
        *lock(&self.held)
    }
}

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    match mutex.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

/// Per-file concurrency guard.
#[derive(Debug, Default)]
pub struct FileGuard {
    readers: Mutex<usize>,
    access: AccessLock,
}

impl FileGuard {
    /// Create a free guard.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Join the reader group, blocking while a writer holds the file.
    pub fn acquire_read(&self) {
        let mut readers = lock(&self.readers);
        *readers += 1;
        if *readers == 1 {
            // Later readers queue on the count lock until the writer leaves.
            self.access.acquire();
        }
    }

    /// Leave the reader group, freeing the file once the last reader exits.
    pub fn release_read(&self) {
        let mut readers = lock(&self.readers);
        if *readers == 0 {
            return;
        }
        *readers -= 1;
        if *readers == 0 {
            self.access.release();
        }
    }

    /// Take exclusive access, blocking while readers or a writer hold it.
    pub fn acquire_write(&self) {
        self.access.acquire();
    }

    /// Give up exclusive access.
    pub fn release_write(&self) {
        self.access.release();
    }

    /// Number of readers currently in the group.
    #[must_use]
    pub fn reader_count(&self) -> usize {
        *lock(&self.readers)
    }

    /// Whether a writer or the reader group currently holds access.
    #[must_use]
    pub fn is_held(&self) -> bool {
        self.access.is_held()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::mpsc;
    use std::sync::Arc;
    use std::thread;
    use std::time::Duration;

    #[test]
    fn readers_share_access() {
        let guard = FileGuard::new();
        guard.acquire_read();
        guard.acquire_read();
        assert_eq!(guard.reader_count(), 2);
        assert!(guard.is_held());
        guard.release_read();
        assert!(guard.is_held());
        guard.release_read();
        assert!(!guard.is_held());
    }

    #[test]
    fn last_reader_may_release_on_another_thread() {
        let guard = Arc::new(FileGuard::new());
        guard.acquire_read();
        let remote = Arc::clone(&guard);
        thread::spawn(move || remote.release_read())
            .join()
            .expect("release thread");
        assert!(!guard.is_held());
        guard.acquire_write();
        guard.release_write();
    }

    #[test]
    fn writer_waits_for_readers() {
        let guard = Arc::new(FileGuard::new());
        guard.acquire_read();
        let (tx, rx) = mpsc::channel();
        let writer = {
            let guard = Arc::clone(&guard);
            thread::spawn(move || {
                guard.acquire_write();
                tx.send(()).expect("send");
                guard.release_write();
            })
        };
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        guard.release_read();
        rx.recv_timeout(Duration::from_secs(5))
            .expect("writer proceeds after reader leaves");
        writer.join().expect("writer thread");
    }

    #[test]
    fn reader_waits_for_writer() {
        let guard = Arc::new(FileGuard::new());
        guard.acquire_write();
        let (tx, rx) = mpsc::channel();
        let reader = {
            let guard = Arc::clone(&guard);
            thread::spawn(move || {
                guard.acquire_read();
                tx.send(()).expect("send");
                guard.release_read();
            })
        };
        assert!(rx.recv_timeout(Duration::from_millis(100)).is_err());
        guard.release_write();
        rx.recv_timeout(Duration::from_secs(5))
            .expect("reader proceeds after writer leaves");
        reader.join().expect("reader thread");
    }

    #[test]
    fn unmatched_release_read_is_ignored() {
        let guard = FileGuard::new();
        guard.release_read();
        assert_eq!(guard.reader_count(), 0);
        assert!(!guard.is_held());
    }
}
