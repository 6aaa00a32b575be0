use assert_cmd::Command;
use httpmock::MockServer;
use predicates::str::contains;
use std::io::Write;
use tempfile::NamedTempFile;

fn page_file(contents: &str) -> NamedTempFile {
    let mut file = NamedTempFile::new().expect("tmp file");
    file.write_all(contents.as_bytes()).expect("write page");
    file
}

fn tessera() -> Command {
    let mut cmd = Command::new(assert_cmd::cargo::cargo_bin!("tessera"));
    cmd.env_remove("TESSERA_CONFIG_FILE")
        .env_remove("TESSERA__ASSISTANT__ENDPOINT")
        .env_remove("TESSERA__ASSISTANT__API_KEY")
        .env_remove("TESSERA__RENDER__RAW_HTML");
    cmd
}

const PAGE: &str = r#"{
    "title": "Cleaning schedule",
    "status": "published",
    "content": "[{\"id\":\"h\",\"type\":\"heading\",\"level\":1,\"text\":\"Welcome\"},{\"id\":\"r\",\"type\":\"html\",\"content\":\"<p>Daily</p><script>x()</script>\"}]"
}"#;

#[test]
fn render_prints_the_page() {
    let page = page_file(PAGE);
    let assert = tessera().arg("render").arg(page.path()).assert().success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    assert!(output.contains(r#"<h1 class="block-heading text-4xl text-left">Welcome</h1>"#));
    assert!(output.contains(r#"<div class="block-html"><p>Daily</p></div>"#));
    assert!(output.contains("Published at /cleaning-schedule"));
}

#[test]
fn render_trusted_keeps_raw_markup() {
    let page = page_file(PAGE);
    tessera()
        .args(["render", "--raw-html", "trusted"])
        .arg(page.path())
        .assert()
        .success()
        .stdout(contains("<script>x()</script>"));
}

#[test]
fn render_reads_standard_input_and_writes_a_file() {
    let output = NamedTempFile::new().expect("tmp file");
    tessera()
        .args(["render", "-", "-o"])
        .arg(output.path())
        .write_stdin(r#"{"title":"Stdin","content":"<p>Legacy body</p>"}"#)
        .assert()
        .success();

    let html = std::fs::read_to_string(output.path()).expect("read output");
    assert!(html.contains(r#"data-block-key="legacy-content""#));
    assert!(html.contains("<p>Legacy body</p>"));
}

#[test]
fn preview_uses_the_requested_viewport() {
    let page = page_file(PAGE);
    tessera()
        .args(["preview", "--viewport", "tablet"])
        .arg(page.path())
        .assert()
        .success()
        .stdout(contains(r#"data-viewport="tablet""#))
        .stdout(contains("max-width: 768px"));
}

#[test]
fn preview_viewport_can_come_from_the_environment() {
    let page = page_file(PAGE);
    tessera()
        .env("TESSERA__PREVIEW__DEFAULT_VIEWPORT", "mobile")
        .arg("preview")
        .arg(page.path())
        .assert()
        .success()
        .stdout(contains("max-width: 375px"));
}

#[test]
fn malformed_document_fails() {
    let page = page_file("{ not json");
    tessera()
        .arg("render")
        .arg(page.path())
        .assert()
        .failure()
        .stderr(contains("page document is invalid"));
}

#[test]
fn assist_prints_the_reply() {
    let server = MockServer::start();
    let mock = server.mock(|when, then| {
        when.method("POST").path("/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"text":"Clean the slicer after every use."}"#);
    });

    tessera()
        .args(["assist", "--prompt", "Slicer rules?", "--assistant-endpoint"])
        .arg(server.url("/generate"))
        .assert()
        .success()
        .stdout(contains("Clean the slicer after every use."));
    mock.assert();
}

#[test]
fn assist_as_block_prints_an_ai_block() {
    let server = MockServer::start();
    server.mock(|when, then| {
        when.method("POST").path("/generate");
        then.status(200)
            .header("content-type", "application/json")
            .body(r#"{"text":"<p>Wear gloves.</p>"}"#);
    });

    let assert = tessera()
        .env("TESSERA__ASSISTANT__ENDPOINT", server.url("/generate"))
        .args(["assist", "--prompt", "Gloves?", "--as-block"])
        .assert()
        .success();

    let output = String::from_utf8_lossy(&assert.get_output().stdout);
    let block: serde_json::Value = serde_json::from_str(&output).expect("block json");
    assert_eq!(block["type"], "ai");
    assert_eq!(block["content"], "<p>Wear gloves.</p>");
    assert!(block["id"].as_str().is_some_and(|id| !id.is_empty()));
}

#[test]
fn assist_without_endpoint_fails_fast() {
    tessera()
        .args(["assist", "--prompt", "hello"])
        .assert()
        .failure()
        .stderr(contains("assistant endpoint is not configured"));
}
