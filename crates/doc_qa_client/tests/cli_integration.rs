//! Integration tests for the doc-qa binary.
//! Uses assert_cmd to run the binary, a real temp config, and a wiremock
//! backend. The binary runs on a blocking thread so the mock keeps serving.

use assert_cmd::cargo::cargo_bin_cmd;
use assert_cmd::Command;
use predicates::prelude::*;
use serde_json::json;
use std::io::Write as _;
use std::time::Duration;
use wiremock::matchers::{body_json, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FALLBACK: &str = "Sorry, an error occurred while processing your request.";

fn free_port() -> u16 {
    let l = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
    l.local_addr().unwrap().port()
}

/// Write a minimal YAML config pointing at `base_url`.
fn write_config(dir: &tempfile::TempDir, base_url: &str) -> std::path::PathBuf {
    let path = dir.path().join("config.yaml");
    let mut f = std::fs::File::create(&path).unwrap();
    writeln!(f, "server:\n  base_url: {}\nui:\n  color: false", base_url).unwrap();
    path
}

/// Backend that answers one question with markdown and two sources.
async fn answering_server(question: &str) -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .and(body_json(json!({ "question": question })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "answer": "**Test** answer.\n\n```java\nclass A {}\n```\n",
            "sources": ["/docs/a.md", "/docs/b.md"]
        })).set_delay(Duration::from_millis(100)))
        .mount(&server)
        .await;
    server
}

fn doc_qa(dir: &tempfile::TempDir) -> Command {
    let mut cmd = Command::from(cargo_bin_cmd!("doc-qa"));
    cmd.env("HOME", dir.path())
        .env("USERPROFILE", dir.path())
        .env_remove("DOC_QA_CONFIG")
        .env("RUST_LOG", "error");
    cmd
}

async fn run(mut cmd: Command) -> assert_cmd::assert::Assert {
    tokio::task::spawn_blocking(move || cmd.assert())
        .await
        .unwrap()
}

#[tokio::test(flavor = "multi_thread")]
async fn prints_answer_and_sources() {
    let server = answering_server("What is the answer?").await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = doc_qa(&dir);
    cmd.arg("--config").arg(&config_path).arg("What is the answer?");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::starts_with("Chromium Android Assistant\n\n[Ask Question]\n"))
        .stderr(predicate::str::contains("[Loading...]"))
        .stdout(predicate::str::contains("Answer:"))
        .stdout(predicate::str::contains("Test answer."))
        .stdout(predicate::str::contains("class A {}"))
        .stdout(predicate::str::contains("Sources:"))
        .stdout(predicate::str::contains("/docs/a.md"))
        .stdout(predicate::str::contains("/docs/b.md"));
}

#[tokio::test(flavor = "multi_thread")]
async fn reads_question_from_stdin_with_config_env_var() {
    let server = answering_server("What is the answer?").await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = doc_qa(&dir);
    cmd.env("DOC_QA_CONFIG", &config_path)
        .write_stdin("What is the answer?\n");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Test answer."));
}

#[tokio::test(flavor = "multi_thread")]
async fn url_flag_works_without_config_file() {
    let server = answering_server("hi").await;
    let dir = tempfile::tempdir().unwrap();

    let mut cmd = doc_qa(&dir);
    cmd.arg("--url").arg(server.uri()).arg("--no-color").arg("hi");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Test answer."));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_error_prints_fallback_and_logs_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/query"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = doc_qa(&dir);
    cmd.arg("--config").arg(&config_path).arg("boom");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains(FALLBACK))
        .stdout(predicate::str::contains("Sources:").not())
        .stderr(predicate::str::contains("query failed"))
        .stderr(predicate::str::contains("500"));
}

#[tokio::test(flavor = "multi_thread")]
async fn server_down_prints_fallback() {
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &format!("http://127.0.0.1:{}", free_port()));

    let mut cmd = doc_qa(&dir);
    cmd.arg("--config").arg(&config_path).write_stdin("hello\n");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains(FALLBACK))
        .stderr(predicate::str::is_match("(?i)(connect|error|refused)").unwrap());
}

#[tokio::test(flavor = "multi_thread")]
async fn interactive_mode_answers_until_quit() {
    let server = answering_server("first").await;
    let dir = tempfile::tempdir().unwrap();
    let config_path = write_config(&dir, &server.uri());

    let mut cmd = doc_qa(&dir);
    cmd.arg("--config")
        .arg(&config_path)
        .arg("--interactive")
        .write_stdin("first\n:quit\nnever sent\n");

    run(cmd)
        .await
        .success()
        .stdout(predicate::str::contains("Chromium Android Assistant"))
        .stdout(predicate::str::contains("Test answer."))
        .stderr(predicate::str::contains("[Loading...]"));

    let requests = server.received_requests().await.unwrap();
    assert_eq!(requests.len(), 1);
}

#[test]
fn explicit_missing_config_fails() {
    let dir = tempfile::tempdir().unwrap();
    let mut cmd = doc_qa(&dir);
    cmd.arg("--config")
        .arg(dir.path().join("missing.yaml"))
        .arg("q");

    cmd.assert()
        .failure()
        .stderr(predicate::str::contains("failed to load config"));
}
