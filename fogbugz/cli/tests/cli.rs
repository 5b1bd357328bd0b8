//! Integration tests for the fogbugz CLI.

use assert_cmd::Command;
use predicates::prelude::*;
use wiremock::matchers::{body_string_contains, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn fogbugz_cmd() -> Command {
    let mut cmd = Command::cargo_bin("fogbugz").unwrap();
    cmd.env_remove("FOGBUGZ_URL")
        .env_remove("FOGBUGZ_TOKEN")
        .env_remove("FOGBUGZ_TIMEOUT_SECS")
        .env_remove("RUST_LOG");
    cmd
}

#[test]
fn cli_shows_help() {
    fogbugz_cmd()
        .arg("--help")
        .assert()
        .success()
        .stdout(predicate::str::contains("Run a FogBugz API command"))
        .stdout(predicate::str::contains("--url"))
        .stdout(predicate::str::contains("--file"))
        .stdout(predicate::str::contains("NAME=VALUE"));
}

#[test]
fn cli_shows_version() {
    fogbugz_cmd()
        .arg("--version")
        .assert()
        .success()
        .stdout(predicate::str::contains("fogbugz 0.1.0"));
}

#[test]
fn cli_requires_url() {
    fogbugz_cmd()
        .arg("listProjects")
        .assert()
        .failure()
        .stderr(predicate::str::contains("FOGBUGZ_URL"))
        .stderr(predicate::str::contains("--url"));
}

#[test]
fn cli_rejects_malformed_field() {
    fogbugz_cmd()
        .args(["--url", "http://127.0.0.1:9", "search", "assignedto:me"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("expected NAME=VALUE"));
}

#[test]
fn cli_reports_missing_attachment() {
    fogbugz_cmd()
        .args([
            "--url",
            "http://127.0.0.1:9",
            "--file",
            "/nonexistent/fogbugz-attachment.bin",
            "new",
        ])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to read attachment"));
}

#[test]
fn cli_reports_connection_failure() {
    fogbugz_cmd()
        .args(["--url", "http://127.0.0.1:9", "listProjects"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("http://127.0.0.1:9/api.xml"));
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200)
        .insert_header("content-type", "text/xml")
        .set_body_string(body)
}

/// A mock installation answering discovery below `/fogbugz/`.
async fn installation() -> MockServer {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/fogbugz/api.xml"))
        .respond_with(xml("<response><version>8</version><url>api.asp?</url></response>"))
        .mount(&server)
        .await;
    server
}

// The mock server runs on its own thread, so the blocking process
// assertions below do not stall it.

#[tokio::test(flavor = "multi_thread")]
async fn cli_prints_response_xml() {
    let server = installation().await;
    Mock::given(method("POST"))
        .and(path("/fogbugz/api.asp"))
        .and(body_string_contains("name=\"q\"\r\n\r\nassignedto:me\r\n"))
        .and(body_string_contains("name=\"cmd\"\r\n\r\nsearch\r\n"))
        .and(body_string_contains("name=\"token\"\r\n\r\nabc123\r\n"))
        .respond_with(xml(
            "<response><cases count=\"1\"><case ixBug=\"7\"><sTitle><![CDATA[Crash & burn]]></sTitle></case></cases></response>",
        ))
        .expect(1)
        .mount(&server)
        .await;

    fogbugz_cmd()
        .args(["--url", &format!("{}/fogbugz", server.uri())])
        .args(["--token", "abc123", "search", "q=assignedto:me"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "<cases count=\"1\"><case ixBug=\"7\"><sTitle>Crash &amp; burn</sTitle></case></cases>",
        ));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_reads_url_and_token_from_env() {
    let server = installation().await;
    Mock::given(method("POST"))
        .and(body_string_contains("name=\"token\"\r\n\r\nfrom-env\r\n"))
        .respond_with(xml("<response><filters/></response>"))
        .expect(1)
        .mount(&server)
        .await;

    fogbugz_cmd()
        .env("FOGBUGZ_URL", format!("{}/fogbugz", server.uri()))
        .env("FOGBUGZ_TOKEN", "from-env")
        .arg("listFilters")
        .assert()
        .success()
        .stdout(predicate::str::contains("<filters/>"));
}

#[tokio::test(flavor = "multi_thread")]
async fn cli_logs_off_after_failed_command() {
    let server = installation().await;
    Mock::given(method("POST"))
        .and(body_string_contains("\r\n\r\nview\r\n"))
        .respond_with(xml("<response><error code=\"10\">Case not found</error></response>"))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("POST"))
        .and(body_string_contains("\r\n\r\nlogoff\r\n"))
        .respond_with(xml("<response></response>"))
        .expect(1)
        .mount(&server)
        .await;

    fogbugz_cmd()
        .args(["--url", &format!("{}/fogbugz", server.uri())])
        .args(["--token", "abc123", "--logoff", "view", "ixBug=404"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("Error Code 10: Case not found"));
}
