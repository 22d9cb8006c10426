//! `POST /search`, `POST /search/graph` (deny-list), and `POST /index/repo` + status.

use std::time::Duration;

use super::common::spawn_server;

#[tokio::test]
async fn search_graph_rejects_write_verb_then_accepts_read_query() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base_url}/api/v1/search/graph"))
        .json(&serde_json::json!({"query": "MATCH (n) DELETE n"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    let resp = client
        .post(format!("{base_url}/api/v1/search/graph"))
        .json(&serde_json::json!({"query": "MATCH (n:Function) RETURN n LIMIT 5"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);
    let body: serde_json::Value = resp.json().await.unwrap();
    assert!(body["rows"].as_array().unwrap().is_empty());

    server_handle.abort();
}

#[tokio::test]
async fn search_rejects_empty_query() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base_url}/api/v1/search"))
        .json(&serde_json::json!({"query": "   "}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    server_handle.abort();
}

#[tokio::test]
async fn index_repo_accepts_request_and_reuses_id_on_reindex() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let body = serde_json::json!({
        "repo_url": "https://example.com/acme/widgets.git",
        "branch": "main",
    });

    let accepted: serde_json::Value = client
        .post(format!("{base_url}/api/v1/index/repo"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accepted["status"], "started");
    let repository_id = accepted["repository_id"].as_str().unwrap().to_string();

    // The mock indexing job finishes within a few `yield_now` points; give it a moment,
    // then the status endpoint must still answer (200, even once the job is no longer
    // tracked and its fields go back to null) rather than error.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let status_resp = client
        .get(format!("{base_url}/api/v1/index/{repository_id}/status"))
        .send()
        .await
        .unwrap();
    assert_eq!(status_resp.status(), reqwest::StatusCode::OK);
    let status: serde_json::Value = status_resp.json().await.unwrap();
    assert_eq!(status["repository_id"], repository_id);

    // Re-indexing the same normalized url reuses the same repository id.
    tokio::time::sleep(Duration::from_millis(50)).await;
    let accepted_again: serde_json::Value = client
        .post(format!("{base_url}/api/v1/index/repo"))
        .json(&body)
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accepted_again["repository_id"], repository_id);

    server_handle.abort();
}

#[tokio::test]
async fn index_repo_rejects_hostile_branch() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base_url}/api/v1/index/repo"))
        .json(&serde_json::json!({
            "repo_url": "https://example.com/acme/widgets.git",
            "branch": "main; rm -rf /",
        }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    server_handle.abort();
}
