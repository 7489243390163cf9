use std::io::{BufRead, BufReader, Write};
use std::net::TcpListener;
use std::path::PathBuf;
use std::process::{Command, Stdio};
use std::thread;
use std::time::{SystemTime, UNIX_EPOCH};

fn temp_path(name: &str) -> PathBuf {
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap()
        .as_nanos();
    std::env::temp_dir().join(format!("taskboard-{nanos}-{name}"))
}

/// Answers each request with the next scripted `(status, body)` pair.
fn serve(responses: Vec<(&'static str, String)>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").unwrap();
    let addr = listener.local_addr().unwrap();

    thread::spawn(move || {
        for ((status, body), stream) in responses.into_iter().zip(listener.incoming()) {
            let mut stream = stream.unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut line = String::new();
            while reader.read_line(&mut line).unwrap() > 0 && line != "\r\n" {
                line.clear();
            }
            let response = format!(
                "HTTP/1.1 {status}\r\nContent-Type: application/json\r\nContent-Length: {}\r\nConnection: close\r\n\r\n{body}",
                body.len()
            );
            stream.write_all(response.as_bytes()).unwrap();
        }
    });

    format!("http://{addr}/posts")
}

fn posts_body(count: u64) -> String {
    let posts: Vec<serde_json::Value> = (1..=count)
        .map(|id| {
            let title = if id % 2 == 0 {
                format!("alpha beta {id}")
            } else {
                format!("alpha {id}")
            };
            serde_json::json!({ "userId": 1, "id": id, "title": title, "body": "" })
        })
        .collect();
    serde_json::Value::Array(posts).to_string()
}

fn run_interactive(input: &str, posts_url: &str) -> std::process::Output {
    let exe = env!("CARGO_BIN_EXE_taskboard");
    let store_dir = temp_path("cli-interactive");

    let mut child = Command::new(exe)
        .env("TASKBOARD_STORE_DIR", &store_dir)
        .env("TASKBOARD_CONFIG_PATH", store_dir.join("missing-config.json"))
        .env("TASKBOARD_POSTS_URL", posts_url)
        .env_remove("HTTP_PROXY")
        .env_remove("http_proxy")
        .env_remove("ALL_PROXY")
        .env_remove("all_proxy")
        .stdin(Stdio::piped())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .spawn()
        .expect("failed to spawn interactive session");

    {
        let stdin = child.stdin.as_mut().expect("stdin");
        stdin
            .write_all(input.as_bytes())
            .expect("failed to write to stdin");
    }

    let output = child
        .wait_with_output()
        .expect("failed to read interactive output");

    std::fs::remove_dir_all(&store_dir).ok();
    output
}

const NO_SERVER: &str = "http://127.0.0.1:9/posts";

#[test]
fn interactive_help_shows_usage() {
    let output = run_interactive("help\nexit\n", NO_SERVER);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Usage") || stdout.contains("USAGE"));
}

#[test]
fn interactive_invalid_command_prints_error() {
    let output = run_interactive("nope\nexit\n", NO_SERVER);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input"));
}

#[test]
fn interactive_add_then_list() {
    let output = run_interactive("add \"Buy milk\"\nadd \"   \"\nlist\nexit\n", NO_SERVER);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Added task: Buy milk"));
    assert!(stdout.contains("All (1) | Active (1) | Completed (0)"));
    assert!(stdout.contains("1 task remaining"));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: invalid_input - text is required"));
}

#[test]
fn interactive_search_change_resets_page() {
    let url = serve(vec![("200 OK", posts_body(13))]);
    let input = "--json posts --search alpha\n--json next\n--json posts --search \"alpha beta\"\nexit\n";

    let output = run_interactive(input, &url);
    assert!(output.status.success());
    let stdout = String::from_utf8_lossy(&output.stdout);
    let pages: Vec<serde_json::Value> = stdout
        .lines()
        .map(|line| serde_json::from_str(line).expect("json line"))
        .collect();

    assert_eq!(pages.len(), 3);
    assert_eq!(pages[0]["page"], 1);
    assert_eq!(pages[0]["total_pages"], 3);
    assert_eq!(pages[1]["page"], 2);
    assert_eq!(pages[2]["page"], 1);
    assert_eq!(pages[2]["total_matched"], 6);
}

#[test]
fn interactive_retry_after_failure() {
    let url = serve(vec![
        ("500 Internal Server Error", "{}".to_string()),
        ("200 OK", posts_body(3)),
    ]);

    let output = run_interactive("posts\nretry\nexit\n", &url);
    assert!(output.status.success());
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("ERROR: network_error"));
    assert!(stderr.contains("retry"));
    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("Found 3 posts"));
}
