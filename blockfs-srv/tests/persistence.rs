// CLASSIFICATION: COMMUNITY
// Filename: persistence.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

use std::sync::Arc;
use std::thread;

use blockfs::FileSystem;
use blockfs_srv::Executor;

#[test]
fn concurrent_executors_leave_a_complete_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");

    for round in 0..5 {
        let fs = Arc::new(FileSystem::default());
        let handles: Vec<_> = (0..8)
            .map(|user| {
                let fs = Arc::clone(&fs);
                let state = state.clone();
                thread::spawn(move || {
                    let exec = Executor::new(fs, format!("user{user}"), Some(state));
                    for n in 0..20 {
                        let reply = exec.execute_line(&format!("mkdir r{round}u{user}n{n}"));
                        assert!(!reply.body.starts_with("error"), "{}", reply.body);
                    }
                })
            })
            .collect();
        for handle in handles {
            handle.join().expect("client thread");
        }

        let restored = FileSystem::default();
        restored
            .load_snapshot(&state)
            .unwrap_or_else(|err| panic!("round {round}: unreadable snapshot: {err}"));
        assert_eq!(
            restored.export_tree().unwrap(),
            fs.export_tree().unwrap(),
            "round {round}: snapshot is stale"
        );
    }
}

#[test]
fn deep_tree_restores_after_restart() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let fs = Arc::new(FileSystem::default());
    let exec = Executor::new(Arc::clone(&fs), "deep", Some(state.clone()));
    let mut path = String::new();
    for _ in 0..70 {
        path.push_str("/d");
        assert_eq!(exec.execute_line(&format!("mkdir {path}")).body, format!("created directory {path}"));
    }
    exec.execute_line(&format!("touch {path}/leaf.txt"));

    let restored = FileSystem::default();
    blockfs_srv::server::restore_state(&restored, &state);
    assert!(restored
        .resolve_file(&format!("{path}/leaf.txt"))
        .unwrap()
        .is_some());
}
