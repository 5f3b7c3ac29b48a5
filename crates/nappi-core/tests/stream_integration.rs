//! Integration tests for the alert stream client against a mock SSE server.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use nappi_core::stream::{AlertStreamClient, ConnectionState};

const ALERT_1: &str = r#"{"id":1,"subject_id":7,"type":"awakening","severity":"info","title":"Baby woke up","message":"Baby was awake at 03:12.","read":false,"created_at":"2024-01-01T03:12:00Z"}"#;
const ALERT_2: &str = r#"{"id":2,"subject_id":7,"type":"temperature","severity":"warning","title":"Room temperature high","message":"26C at 15:42.","read":false,"created_at":"2024-01-01T15:42:00Z"}"#;

/// Poll until the condition holds or the deadline passes.
async fn wait_for(mut condition: impl FnMut() -> bool) {
    for _ in 0..200 {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    panic!("condition not reached within deadline");
}

#[tokio::test]
async fn alerts_flow_into_buffer_in_arrival_order() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::UrlEncoded(
            "user_id".into(),
            "42".into(),
        ))
        .with_header("content-type", "text/event-stream")
        .with_body(format!(
            "event: connected\n\ndata: {ALERT_1}\n\ndata: {ALERT_2}\n\n"
        ))
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_secs(60)).unwrap();

    let handler_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&handler_calls);
    client.set_handler(move |_alert| {
        calls.fetch_add(1, Ordering::SeqCst);
    });

    client.connect(42);

    let buffer = client.buffer();
    wait_for(|| buffer.lock().unwrap().len() == 2).await;

    {
        let buffer = buffer.lock().unwrap();
        let ids: Vec<i64> = buffer.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![2, 1], "newest first");
        assert_eq!(buffer.unread_count(), 2);
    }
    assert_eq!(handler_calls.load(Ordering::SeqCst), 2);
    assert_eq!(client.latest().unwrap().id, 2);

    client.disconnect();
    assert_eq!(client.state(), ConnectionState::Disconnected);
    mock.assert_async().await;
}

#[tokio::test]
async fn single_alert_fires_handler_exactly_once() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "text/event-stream")
        .with_body(format!("data: {ALERT_1}\n\n"))
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_secs(60)).unwrap();
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&handler_calls);
    client.set_handler(move |alert| {
        assert_eq!(alert.title, "Baby woke up");
        calls.fetch_add(1, Ordering::SeqCst);
    });
    client.connect(42);

    let buffer = client.buffer();
    wait_for(|| buffer.lock().unwrap().len() == 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    assert_eq!(buffer.lock().unwrap().unread_count(), 1);
    client.disconnect();
}

#[tokio::test]
async fn malformed_frames_are_dropped_while_connected() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|writer| {
            writer.write_all(
                b"event: connected\n\ndata: not json\n\ndata: {\"id\":\n\ndata: 12345\n\n",
            )?;
            // Keep the connection open so state stays Connected while the
            // malformed frames are (not) processed.
            std::thread::sleep(Duration::from_millis(400));
            Ok(())
        })
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_secs(60)).unwrap();
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&handler_calls);
    client.set_handler(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });
    client.connect(42);

    wait_for(|| client.state() == ConnectionState::Connected).await;
    tokio::time::sleep(Duration::from_millis(200)).await;

    assert_eq!(client.state(), ConnectionState::Connected);
    assert_eq!(client.buffer().lock().unwrap().len(), 0);
    assert_eq!(handler_calls.load(Ordering::SeqCst), 0);
    assert!(client.latest().is_none());
    client.disconnect();
}

#[tokio::test]
async fn named_events_are_not_ingested_as_alerts() {
    let mut server = mockito::Server::new_async().await;
    let _mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "text/event-stream")
        // A foreign named event carrying a valid alert body must be
        // ignored; only the unnamed frame is an alert.
        .with_body(format!(
            "event: heartbeat\ndata: {ALERT_1}\n\ndata: {ALERT_2}\n\n"
        ))
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_secs(60)).unwrap();
    let handler_calls = Arc::new(AtomicUsize::new(0));
    let calls = Arc::clone(&handler_calls);
    client.set_handler(move |_| {
        calls.fetch_add(1, Ordering::SeqCst);
    });
    client.connect(42);

    let buffer = client.buffer();
    wait_for(|| buffer.lock().unwrap().len() == 1).await;
    tokio::time::sleep(Duration::from_millis(50)).await;

    {
        let buffer = buffer.lock().unwrap();
        assert_eq!(buffer.len(), 1);
        assert_eq!(buffer.latest().unwrap().id, 2);
    }
    assert_eq!(handler_calls.load(Ordering::SeqCst), 1);
    client.disconnect();
}

#[tokio::test]
async fn reconnects_once_after_fixed_delay() {
    let mut server = mockito::Server::new_async().await;
    // Expect exactly two connection attempts: the initial one and one
    // reconnect after the fixed delay.
    let mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "text/event-stream")
        .with_body("event: connected\n\n")
        .expect(2)
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_millis(400)).unwrap();
    client.connect(42);

    // Well before the delay elapses: one attempt only, disconnected.
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert!(!mock.matched_async().await, "reconnected too early");
    assert_eq!(client.state(), ConnectionState::Disconnected);

    // After the delay: exactly the second attempt has happened.
    tokio::time::sleep(Duration::from_millis(400)).await;
    assert!(mock.matched_async().await, "expected exactly one reconnect");

    // Disconnect cancels the pending timer; no third attempt follows.
    client.disconnect();
    tokio::time::sleep(Duration::from_millis(600)).await;
    assert!(mock.matched_async().await, "reconnect fired after disconnect");
}

#[tokio::test]
async fn disconnect_before_delay_cancels_reconnect() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "text/event-stream")
        .with_body("")
        .expect(1)
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_millis(150)).unwrap();
    client.connect(42);

    tokio::time::sleep(Duration::from_millis(80)).await;
    client.disconnect();

    tokio::time::sleep(Duration::from_millis(400)).await;
    mock.assert_async().await;
}

#[tokio::test]
async fn handler_can_be_swapped_without_reconnecting() {
    let mut server = mockito::Server::new_async().await;
    let mock = server
        .mock("GET", "/alerts/stream")
        .match_query(mockito::Matcher::Any)
        .with_header("content-type", "text/event-stream")
        .with_chunked_body(|writer| {
            writer.write_all(format!("data: {ALERT_1}\n\n").as_bytes())?;
            writer.flush()?;
            std::thread::sleep(Duration::from_millis(300));
            writer.write_all(format!("data: {ALERT_2}\n\n").as_bytes())?;
            Ok(())
        })
        .expect(1)
        .create_async()
        .await;

    let mut client =
        AlertStreamClient::with_reconnect_delay(&server.url(), Duration::from_secs(60)).unwrap();

    let first = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&first);
    client.set_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });
    client.connect(42);

    let buffer = client.buffer();
    wait_for(|| buffer.lock().unwrap().len() == 1).await;

    // Swap the handler mid-connection.
    let second = Arc::new(AtomicUsize::new(0));
    let counter = Arc::clone(&second);
    client.set_handler(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
    });

    wait_for(|| buffer.lock().unwrap().len() == 2).await;

    assert_eq!(first.load(Ordering::SeqCst), 1);
    assert_eq!(second.load(Ordering::SeqCst), 1);
    client.disconnect();
    mock.assert_async().await;
}
