//! Shared fixtures for integration tests
#![allow(dead_code)]

use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::io::Write;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Mount repository metadata with the given default branch.
pub async fn mount_repository(server: &MockServer, repo: &str, default_branch: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}", repo)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "default_branch": default_branch,
            "private": false,
        })))
        .mount(server)
        .await;
}

/// Mount the branch head endpoint returning `sha`.
pub async fn mount_branch_head(server: &MockServer, repo: &str, branch: &str, sha: &str) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/branches/{}", repo, branch)))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "name": branch,
            "commit": { "sha": sha },
        })))
        .mount(server)
        .await;
}

/// Mount a directory listing; `dir_path` empty means the repository root.
pub async fn mount_listing(
    server: &MockServer,
    repo: &str,
    branch: &str,
    dir_path: &str,
    entries: serde_json::Value,
) {
    let url_path = if dir_path.is_empty() {
        format!("/repos/{}/contents", repo)
    } else {
        format!("/repos/{}/contents/{}", repo, dir_path)
    };
    Mock::given(method("GET"))
        .and(path(url_path))
        .and(query_param("ref", branch))
        .respond_with(ResponseTemplate::new(200).set_body_json(entries))
        .mount(server)
        .await;
}

/// Mount a single-file contents response with base64-encoded text.
pub async fn mount_file(
    server: &MockServer,
    repo: &str,
    branch: &str,
    file_path: &str,
    text: &str,
) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/contents/{}", repo, file_path)))
        .and(query_param("ref", branch))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "path": file_path,
            "size": text.len(),
            "content": STANDARD.encode(text.as_bytes()),
            "encoding": "base64",
        })))
        .mount(server)
        .await;
}

pub fn dir_entry(path: &str) -> serde_json::Value {
    serde_json::json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "type": "dir",
    })
}

pub fn file_entry(path: &str, size: u64) -> serde_json::Value {
    serde_json::json!({
        "name": path.rsplit('/').next().unwrap(),
        "path": path,
        "type": "file",
        "size": size,
    })
}

/// Build an in-memory zip archive; names ending in '/' become directories.
pub fn zip_bytes(entries: &[(&str, &str)]) -> Vec<u8> {
    let mut cursor = std::io::Cursor::new(Vec::new());
    {
        let mut writer = zip::ZipWriter::new(&mut cursor);
        let options = zip::write::SimpleFileOptions::default();
        for (name, content) in entries {
            if name.ends_with('/') {
                writer
                    .add_directory(name.trim_end_matches('/'), options)
                    .unwrap();
            } else {
                writer.start_file(*name, options).unwrap();
                writer.write_all(content.as_bytes()).unwrap();
            }
        }
        writer.finish().unwrap();
    }
    cursor.into_inner()
}

/// Mount the zipball endpoint serving raw bytes with the given status.
pub async fn mount_zipball(server: &MockServer, repo: &str, branch: &str, bytes: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/zipball/{}", repo, branch)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(bytes))
        .mount(server)
        .await;
}

pub async fn mount_zipball_status(server: &MockServer, repo: &str, branch: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/repos/{}/zipball/{}", repo, branch)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
