//! Integration tests for `sa serve`: a live save request, graceful shutdown
//! on SIGTERM, and startup failures.

use std::io::{BufRead, BufReader, Read, Write};
use std::net::TcpStream;
use std::process::{Child, Command, Stdio};
use std::time::{Duration, Instant};
use tempfile::TempDir;

fn sa_binary() -> std::path::PathBuf {
    assert_cmd::cargo::cargo_bin!("sa").into()
}

fn spawn_serve(data_dir: &TempDir) -> Child {
    let results = data_dir.path().join("results");
    std::fs::write(
        data_dir.path().join("config.toml"),
        format!(
            "[upload]\nbackend = \"local\"\nlocal_dir = {:?}\n",
            results.display().to_string()
        ),
    )
    .unwrap();

    Command::new(sa_binary())
        .args(["serve", "--addr", "127.0.0.1:0"])
        .env("SA_DATA_DIR", data_dir.path())
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn sa serve")
}

/// Read the `listening on http://<addr>` line the server prints on startup.
fn bound_addr(child: &mut Child) -> String {
    let stdout = child.stdout.take().expect("stdout pipe");
    let mut line = String::new();
    BufReader::new(stdout).read_line(&mut line).unwrap();
    line.trim()
        .strip_prefix("listening on http://")
        .unwrap_or_else(|| panic!("unexpected startup line: {line:?}"))
        .to_string()
}

#[cfg(unix)]
fn terminate(child: &Child) {
    unsafe {
        libc::kill(child.id() as libc::pid_t, libc::SIGTERM);
    }
}

#[cfg(unix)]
#[test]
fn serve_exits_cleanly_on_sigterm() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    bound_addr(&mut child);

    terminate(&child);
    let start = Instant::now();
    let status = child.wait().expect("wait");
    let elapsed = start.elapsed();

    assert!(status.success(), "sa serve should exit 0 on SIGTERM, got {status}");
    assert!(elapsed < Duration::from_secs(2), "took {elapsed:?}");
}

#[cfg(unix)]
#[test]
fn second_server_on_same_port_fails() {
    let dir = TempDir::new().unwrap();
    let mut first = spawn_serve(&dir);
    let addr = bound_addr(&mut first);

    let output = Command::new(sa_binary())
        .args(["serve", "--addr", &addr])
        .env("SA_DATA_DIR", dir.path())
        .output()
        .unwrap();
    assert!(!output.status.success());
    assert!(String::from_utf8_lossy(&output.stdout).is_empty());

    terminate(&first);
    assert!(first.wait().expect("wait").success());
}

#[cfg(unix)]
#[test]
fn serve_saves_posted_csv() {
    let dir = TempDir::new().unwrap();
    let mut child = spawn_serve(&dir);
    let addr = bound_addr(&mut child);

    let body = r#"{"filename":"ST_live.csv","csv":"trial,rt\n1,410\n"}"#;
    let mut stream = TcpStream::connect(&addr).unwrap();
    write!(
        stream,
        "POST /api/saveToDrive HTTP/1.1\r\nHost: {addr}\r\nContent-Type: application/json\r\n\
         Content-Length: {}\r\nConnection: close\r\n\r\n{body}",
        body.len()
    )
    .unwrap();
    let mut response = String::new();
    stream.read_to_string(&mut response).unwrap();

    assert!(response.starts_with("HTTP/1.1 200"), "{response}");
    assert!(response.contains("Result saved successfully!"), "{response}");
    assert_eq!(
        std::fs::read_to_string(dir.path().join("results/ST_live.csv")).unwrap(),
        "trial,rt\n1,410\n"
    );

    terminate(&child);
    assert!(child.wait().expect("wait").success());
}

#[test]
fn serve_fails_fast_without_drive_credentials() {
    let dir = TempDir::new().unwrap();
    let output = Command::new(sa_binary())
        .args(["serve", "--addr", "127.0.0.1:0"])
        .env("SA_DATA_DIR", dir.path())
        .env_remove("GOOGLE_CLIENT_EMAIL")
        .env_remove("GOOGLE_PRIVATE_KEY")
        .output()
        .unwrap();
    assert!(!output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("failed to configure upload backend"), "{stderr}");
}
