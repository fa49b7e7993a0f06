//! Integration test: JSON message channel (events and control requests).

mod common;

use common::fixtures::engine;
use serde_json::json;

#[tokio::test]
async fn event_stream_drives_ledger_through_messages() {
    let engine = engine();

    let reply = engine
        .handle_message(
            r#"{"event":"headersReceived","requestId":"9","type":"main_frame","statusCode":200,
                "url":"https://files.example.com/a.zip",
                "responseHeaders":[{"name":"Content-Disposition","value":"attachment; filename=a.zip"}],
                "tabId":1}"#,
        )
        .await;
    assert_eq!(reply, json!({ "ok": true, "candidate": true }));

    let reply = engine
        .handle_message(
            r#"{"event":"determiningFilename","id":12,"filename":"a.zip",
                "url":"https://files.example.com/a.zip","fileSize":3145728,
                "referrer":"https://files.example.com/"}"#,
        )
        .await;
    assert_eq!(reply["intercepted"], true);
    assert_eq!(reply["status"], "downloading");

    let reply = engine
        .handle_message(r#"{"event":"downloadChanged","id":1000,"bytesReceived":{"current":1572864}}"#)
        .await;
    assert_eq!(reply, json!({ "ok": true, "status": "downloading" }));

    let downloads = engine
        .handle_message(r#"{"action":"getInterceptedDownloads"}"#)
        .await;
    let first = &downloads["downloads"][0];
    assert_eq!(first["filename"], "a.zip");
    assert_eq!(first["progress"], 50);
    assert_eq!(first["referrer"], "https://files.example.com/");

    engine
        .handle_message(r#"{"event":"downloadChanged","id":1000,"state":{"current":"complete"}}"#)
        .await;
    let stats = engine.handle_message(r#"{"action":"getStats"}"#).await;
    assert_eq!(
        stats,
        json!({ "total": 1, "downloading": 0, "completed": 1, "failed": 0 })
    );
}

#[tokio::test]
async fn skipped_download_reports_reason() {
    let engine = engine();
    let reply = engine
        .handle_message(
            r#"{"event":"determiningFilename","id":1,"filename":"a.zip",
                "url":"https://www.youtube.com/a.zip","fileSize":99999999,
                "referrer":"https://www.youtube.com/watch"}"#,
        )
        .await;
    assert_eq!(reply["intercepted"], false);
    assert!(reply["reason"].as_str().unwrap().contains("youtube.com"));
}

#[tokio::test]
async fn schemeless_referrer_is_not_intercepted() {
    let engine = engine();
    let reply = engine
        .handle_message(
            r#"{"event":"determiningFilename","id":2,"filename":"a.zip",
                "url":"https://cdn.example.com/a.zip","fileSize":10485760,
                "referrer":"www.youtube.com/watch?v=1"}"#,
        )
        .await;
    assert_eq!(reply["intercepted"], false);
    assert!(reply["reason"].as_str().unwrap().contains("no hostname"));
    assert!(engine.records().is_empty());
    assert!(engine.host().cancelled().is_empty());
}

#[tokio::test]
async fn malformed_messages_get_error_replies() {
    let engine = engine();
    let reply = engine.handle_message("{").await;
    assert!(reply["error"].as_str().unwrap().starts_with("malformed message"));
    let reply = engine.handle_message(r#"{"action":"selfDestruct"}"#).await;
    assert!(reply.get("error").is_some());
    let reply = engine.handle_message(r#"{"foo":"bar"}"#).await;
    assert!(reply["error"].as_str().unwrap().contains("neither"));
}

#[tokio::test]
async fn config_and_toggle_round_trip() {
    let engine = engine();
    let cfg = engine.handle_message(r#"{"action":"getConfig"}"#).await;
    assert_eq!(cfg["config"]["enabled"], true);
    assert_eq!(cfg["config"]["downloadFolder"], "InterceptedDownloads");

    let toggled = engine.handle_message(r#"{"action":"toggleEnabled"}"#).await;
    assert_eq!(toggled, json!({ "enabled": false }));
    let cfg = engine.handle_message(r#"{"action":"getConfig"}"#).await;
    assert_eq!(cfg["config"]["enabled"], false);
}
