//! `GET /chat/{id}/stream` (SSE): subscribing immediately yields a `connected` event.

use futures::StreamExt;

use super::common::spawn_server;

#[tokio::test]
async fn subscribing_emits_connected_event() {
    let (base_url, server_handle, _dir) = spawn_server().await;
    let client = reqwest::Client::new();

    let resp = client
        .get(format!("{base_url}/api/v1/chat/some-conversation/stream"))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), reqwest::StatusCode::OK);

    let mut stream = resp.bytes_stream();
    let chunk = stream.next().await.unwrap().unwrap();
    let text = String::from_utf8_lossy(&chunk);
    assert!(text.contains("event: connected"), "got: {text}");
    assert!(text.contains("\"conversation_id\":\"some-conversation\""), "got: {text}");

    server_handle.abort();
}
