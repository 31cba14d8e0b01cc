//! Mock server helpers for archive downloads

use envkeeper_core::types::RuntimeConfig;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Runtime configuration whose archive base URL points at `server`
pub fn config_for_server(server: &MockServer) -> RuntimeConfig {
    let mut config = RuntimeConfig::default();
    config.archive.base_url = server.uri();
    config
}

/// Serve `content` as the archive of `version`
pub async fn mock_archive(server: &MockServer, version: &str, content: Vec<u8>) {
    Mock::given(method("GET"))
        .and(path(format!("/platform-{}.zip", version)))
        .respond_with(ResponseTemplate::new(200).set_body_bytes(content))
        .mount(server)
        .await;
}

/// Answer requests for the archive of `version` with `status`
pub async fn mock_archive_status(server: &MockServer, version: &str, status: u16) {
    Mock::given(method("GET"))
        .and(path(format!("/platform-{}.zip", version)))
        .respond_with(ResponseTemplate::new(status))
        .mount(server)
        .await;
}
