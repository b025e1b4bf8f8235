// CLASSIFICATION: COMMUNITY
// Filename: fs_concurrency.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

use std::sync::mpsc;
use std::sync::Arc;
use std::thread;
use std::time::Duration;

use blockfs::{FileSystem, FsError, OpenMode, Session};

const WAIT: Duration = Duration::from_millis(200);

fn shared_file(content: &str) -> Arc<FileSystem> {
    let fs = Arc::new(FileSystem::default());
    fs.touch("shared.txt").unwrap();
    let writer = Session::new(Arc::clone(&fs));
    writer.open("shared.txt", OpenMode::Write).unwrap();
    writer.write("shared.txt", content).unwrap();
    fs
}

#[test]
fn readers_proceed_together() {
    let fs = shared_file("abc");
    let first = Session::new(Arc::clone(&fs));
    first.open("shared.txt", OpenMode::Read).unwrap();

    let (tx, rx) = mpsc::channel();
    let fs_cl = Arc::clone(&fs);
    let handle = thread::spawn(move || {
        let second = Session::new(fs_cl);
        second.open("shared.txt", OpenMode::Read).unwrap();
        tx.send(second.read("shared.txt").unwrap()).unwrap();
    });
    assert_eq!(rx.recv_timeout(WAIT).expect("second reader blocked"), "abc");
    assert_eq!(first.read("shared.txt").unwrap(), "abc");
    handle.join().expect("reader thread");
}

#[test]
fn writer_waits_for_every_reader() {
    let fs = shared_file("");
    let readers: Vec<Session> = (0..2)
        .map(|_| {
            let session = Session::new(Arc::clone(&fs));
            session.open("shared.txt", OpenMode::Read).unwrap();
            session
        })
        .collect();

    let (tx, rx) = mpsc::channel();
    let fs_cl = Arc::clone(&fs);
    let handle = thread::spawn(move || {
        let writer = Session::new(fs_cl);
        writer.open("shared.txt", OpenMode::Write).unwrap();
        writer.write("shared.txt", "late").unwrap();
        tx.send(()).unwrap();
    });

    let mut readers = readers.into_iter();
    drop(readers.next());
    assert!(rx.recv_timeout(WAIT).is_err(), "writer ran with a reader active");
    drop(readers.next());
    rx.recv_timeout(Duration::from_secs(5))
        .expect("writer never acquired the file");
    handle.join().expect("writer thread");

    let check = Session::new(Arc::clone(&fs));
    check.open("shared.txt", OpenMode::Read).unwrap();
    assert_eq!(check.read("shared.txt").unwrap(), "late");
}

#[test]
fn reader_waits_for_active_writer() {
    let fs = Arc::new(FileSystem::default());
    fs.touch("shared.txt").unwrap();
    let writer = Session::new(Arc::clone(&fs));
    writer.open("shared.txt", OpenMode::Write).unwrap();

    let (tx, rx) = mpsc::channel();
    let fs_cl = Arc::clone(&fs);
    let handle = thread::spawn(move || {
        let reader = Session::new(fs_cl);
        reader.open("shared.txt", OpenMode::Read).unwrap();
        tx.send(reader.read("shared.txt").unwrap()).unwrap();
    });
    assert!(rx.recv_timeout(WAIT).is_err(), "reader ran during a write");
    writer.write("shared.txt", "done").unwrap();
    writer.close("shared.txt").unwrap();
    assert_eq!(rx.recv_timeout(Duration::from_secs(5)).unwrap(), "done");
    handle.join().expect("reader thread");
}

#[test]
fn delete_wakes_blocked_opener_with_not_found() {
    let fs = Arc::new(FileSystem::default());
    fs.touch("doomed.txt").unwrap();
    let writer = Session::new(Arc::clone(&fs));
    writer.open("doomed.txt", OpenMode::Write).unwrap();

    let (tx, rx) = mpsc::channel();
    let fs_cl = Arc::clone(&fs);
    let handle = thread::spawn(move || {
        let reader = Session::new(fs_cl);
        tx.send(reader.open("doomed.txt", OpenMode::Read)).unwrap();
    });
    assert!(rx.recv_timeout(WAIT).is_err());
    fs.delete("doomed.txt").unwrap();
    let outcome = rx.recv_timeout(Duration::from_secs(5)).expect("opener stayed blocked");
    assert!(matches!(outcome, Err(FsError::NotFound { .. })));
    assert!(matches!(
        writer.close("doomed.txt"),
        Err(FsError::NotFound { .. })
    ));
    handle.join().expect("opener thread");
}

#[test]
fn parallel_writers_on_distinct_files() {
    let fs = Arc::new(FileSystem::new(blockfs::FsConfig::new(4, 64).unwrap()).unwrap());
    let mut handles = Vec::new();
    for i in 0..4 {
        let fs_cl = Arc::clone(&fs);
        handles.push(thread::spawn(move || {
            let path = format!("file{i}.txt");
            fs_cl.touch(&path).unwrap();
            let session = Session::new(Arc::clone(&fs_cl));
            session.open(&path, OpenMode::Write).unwrap();
            for _ in 0..8 {
                session.write(&path, "abcd").unwrap();
            }
        }));
    }
    for h in handles {
        h.join().expect("thread failed");
    }
    assert_eq!(fs.stats().free_blocks, 32);
    let reader = Session::new(Arc::clone(&fs));
    reader.open("file2.txt", OpenMode::Read).unwrap();
    assert_eq!(reader.read("file2.txt").unwrap(), "abcd".repeat(8));
}

#[test]
fn rmdir_wakes_blocked_opener_with_not_found() {
    let fs = Arc::new(FileSystem::default());
    fs.mkdir("doomed").unwrap();
    fs.touch("doomed/a.txt").unwrap();
    let writer = Session::new(Arc::clone(&fs));
    writer.open("doomed/a.txt", OpenMode::Write).unwrap();

    let (tx, rx) = mpsc::channel();
    let fs_cl = Arc::clone(&fs);
    let handle = thread::spawn(move || {
        let reader = Session::new(fs_cl);
        tx.send(reader.open("doomed/a.txt", OpenMode::Read)).unwrap();
    });
    assert!(rx.recv_timeout(WAIT).is_err());
    assert_eq!(fs.rmdir("doomed").unwrap(), 1);
    let outcome = rx.recv_timeout(Duration::from_secs(5)).expect("opener stayed blocked");
    assert!(matches!(outcome, Err(FsError::NotFound { .. })));
    assert!(matches!(
        writer.close("doomed/a.txt"),
        Err(FsError::NotFound { .. })
    ));
    handle.join().expect("opener thread");
}

#[test]
fn import_releases_files_open_in_replaced_tree() {
    let fs = Arc::new(FileSystem::default());
    fs.touch("a.txt").unwrap();
    let record = fs.export_tree().unwrap();
    let writer = Session::new(Arc::clone(&fs));
    writer.open("a.txt", OpenMode::Write).unwrap();

    let (tx, rx) = mpsc::channel();
    let fs_cl = Arc::clone(&fs);
    let handle = thread::spawn(move || {
        let reader = Session::new(fs_cl);
        tx.send(reader.open("a.txt", OpenMode::Read)).unwrap();
    });
    assert!(rx.recv_timeout(WAIT).is_err());
    fs.import_tree(&record).unwrap();

    // The waiter held the old file's guard, which no longer backs a.txt.
    let outcome = rx.recv_timeout(Duration::from_secs(5)).expect("opener stayed blocked");
    assert!(matches!(outcome, Err(FsError::NotFound { .. })));
    handle.join().expect("opener thread");

    assert!(matches!(
        writer.close("a.txt"),
        Err(FsError::NotOpen { .. })
    ));
    let reader = Session::new(Arc::clone(&fs));
    reader.open("a.txt", OpenMode::Read).unwrap();
    assert_eq!(reader.read("a.txt").unwrap(), "");
}
