//! `POST /chat` → `GET status`/`history` → `DELETE` over a real bound server.

use std::time::Duration;

use super::common::spawn_server;

#[tokio::test]
async fn new_conversation_is_accepted_then_closes() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let accept: serde_json::Value = client
        .post(format!("{base_url}/api/v1/chat"))
        .json(&serde_json::json!({
            "message": "what does this repo do?",
            "user_id": "user-1",
            "repo_url": "https://example.com/acme/widgets.git",
            "branch": "main",
        }))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(accept["success"], true);
    let conversation_id = accept["conversation_id"].as_str().unwrap().to_string();

    // The stub selector never picks a tool, so the loop synthesizes immediately; poll
    // history for the assistant's reply rather than sleeping a fixed amount.
    let mut messages = serde_json::json!([]);
    for _ in 0..50 {
        let history: serde_json::Value = client
            .get(format!("{base_url}/api/v1/chat/{conversation_id}/history"))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        messages = history["messages"].clone();
        if messages.as_array().map(|m| m.len()).unwrap_or(0) >= 2 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    let messages = messages.as_array().unwrap();
    assert_eq!(messages.len(), 2);
    assert_eq!(messages[0]["role"], "user");
    assert_eq!(messages[1]["role"], "assistant");
    assert_eq!(messages[1]["content"], "done");

    let status: serde_json::Value = client
        .get(format!("{base_url}/api/v1/chat/{conversation_id}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "ACTIVE");

    let resp = client
        .delete(format!("{base_url}/api/v1/chat/{conversation_id}"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NO_CONTENT);

    let status: serde_json::Value = client
        .get(format!("{base_url}/api/v1/chat/{conversation_id}/status"))
        .send()
        .await
        .unwrap()
        .json()
        .await
        .unwrap();
    assert_eq!(status["status"], "CLOSED");

    server_handle.abort();
}

#[tokio::test]
async fn new_conversation_without_repo_url_is_rejected() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .post(format!("{base_url}/api/v1/chat"))
        .json(&serde_json::json!({"message": "hello", "user_id": "user-1"}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::BAD_REQUEST);

    server_handle.abort();
}

#[tokio::test]
async fn unknown_conversation_history_is_not_found() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base_url}/api/v1/chat/does-not-exist/history"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::NOT_FOUND);

    server_handle.abort();
}
