// CLASSIFICATION: COMMUNITY
// Filename: tcp_service.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

use std::sync::Arc;
use std::thread;

use blockfs::{FileSystem, FsConfig};
use blockfs_srv::{FsClient, FsServer, SrvConfig};

fn spawn_server(fs: Arc<FileSystem>) -> std::net::SocketAddr {
    let server = FsServer::with_fs(fs, "127.0.0.1:0", None).expect("bind");
    let addr = server.local_addr().expect("addr");
    thread::spawn(move || server.serve());
    addr
}

#[test]
fn client_session_round_trip() {
    let fs = Arc::new(FileSystem::new(FsConfig::new(3, 8).unwrap()).unwrap());
    let addr = spawn_server(Arc::clone(&fs));

    let (mut client, welcome) = FsClient::connect(addr, "alice").expect("connect");
    assert_eq!(welcome, "Welcome alice!");
    assert_eq!(client.send("mkdir docs").unwrap(), "created directory docs");
    client.send("touch docs/a.txt").unwrap();
    client.send("open docs/a.txt w").unwrap();
    assert_eq!(
        client.send("write docs/a.txt \"hello world\"").unwrap(),
        "wrote 11 characters to docs/a.txt"
    );
    client.send("close docs/a.txt").unwrap();
    client.send("open docs/a.txt r").unwrap();
    assert_eq!(client.send("read docs/a.txt").unwrap(), "hello world");
    assert_eq!(
        client.send("vtree").unwrap(),
        "/\n---docs\n------a.txt"
    );
    assert_eq!(client.send("exit").unwrap(), "Goodbye alice!");
}

#[test]
fn disconnect_releases_open_files() {
    let fs = Arc::new(FileSystem::default());
    fs.touch("shared.txt").unwrap();
    let addr = spawn_server(Arc::clone(&fs));

    let (mut writer, _) = FsClient::connect(addr, "writer").expect("connect");
    assert_eq!(
        writer.send("open shared.txt w").unwrap(),
        "opened shared.txt for writing"
    );
    drop(writer);

    // The open blocks server-side until the writer's thread sees the closed
    // socket and drops its session.
    let (mut reader, _) = FsClient::connect(addr, "reader").expect("connect");
    assert_eq!(
        reader.send("open shared.txt r").unwrap(),
        "opened shared.txt for reading"
    );
}

#[test]
fn bind_restores_snapshot() {
    let dir = tempfile::tempdir().unwrap();
    let state = dir.path().join("state.json");
    let seed = FileSystem::default();
    seed.mkdir("kept").unwrap();
    seed.save_snapshot(&state).unwrap();

    let cfg = SrvConfig {
        listen: "127.0.0.1:0".into(),
        state_path: Some(state.clone()),
        fs: FsConfig::default(),
    };
    let server = FsServer::bind(&cfg).expect("bind");
    assert!(server.fs().resolve_dir("kept").unwrap().is_some());
    let addr = server.local_addr().unwrap();
    thread::spawn(move || server.serve());

    let (mut client, _) = FsClient::connect(addr, "carol").unwrap();
    client.send("touch kept/new.txt").unwrap();
    let reloaded = FileSystem::default();
    reloaded.load_snapshot(&state).unwrap();
    assert!(reloaded.resolve_file("kept/new.txt").unwrap().is_some());
}
