use anyhow::Result;
use autopro::adapters::RecordingToastSink;
use autopro::core::notifications::{MessageKind, NotificationClient, ReconnectPolicy, RunOutcome};
use autopro::domain::ports::ToastVariant;
use autopro::WsConnector;
use futures_util::{SinkExt, StreamExt};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio_tungstenite::tungstenite::Message;

#[tokio::test]
async fn test_receives_frames_over_websocket() -> Result<()> {
    let listener = TcpListener::bind("127.0.0.1:0").await?;
    let addr = listener.local_addr()?;

    let server = tokio::spawn(async move {
        let (stream, _) = listener.accept().await?;
        let mut ws = tokio_tungstenite::accept_async(stream).await?;
        ws.send(Message::Text(
            r#"{"type":"booking_cancelled","data":{"id":"B1002"},"timestamp":"2025-05-01T10:00:00Z"}"#.to_string(),
        ))
        .await?;
        ws.send(Message::Text("not json".to_string())).await?;
        ws.send(Message::Text(
            r#"{"type":"car_status_changed","data":{"carId":"CAR002","status":"maintenance"},"timestamp":"2025-05-01T10:01:00Z"}"#.to_string(),
        ))
        .await?;
        ws.close(None).await?;
        // drain until the client acknowledges the close
        while let Some(Ok(_)) = ws.next().await {}
        Ok::<_, anyhow::Error>(())
    });

    let toasts = Arc::new(RecordingToastSink::new());
    let policy = ReconnectPolicy {
        auto_reconnect: false,
        reconnect_interval: Duration::from_millis(10),
        max_reconnect_attempts: 5,
    };
    let client = NotificationClient::new(format!("ws://{}", addr), policy, Arc::new(WsConnector), toasts.clone());

    let outcome = tokio::time::timeout(Duration::from_secs(10), client.run()).await??;
    server.await??;

    assert_eq!(outcome, RunOutcome::Closed);
    assert!(!client.is_connected());

    let kinds: Vec<MessageKind> = client.messages().iter().map(|m| m.kind).collect();
    assert_eq!(kinds, vec![MessageKind::BookingCancelled, MessageKind::CarStatusChanged]);

    let shown = toasts.toasts();
    assert_eq!(shown.len(), 2);
    assert_eq!(shown[0].title, "Connected to server");
    assert_eq!(shown[1].title, "Booking cancelled");
    assert_eq!(shown[1].variant, ToastVariant::Destructive);
    Ok(())
}

#[tokio::test]
async fn test_unreachable_server_gives_up() -> Result<()> {
    // bind then drop so the port refuses connections
    let addr = TcpListener::bind("127.0.0.1:0").await?.local_addr()?;

    let toasts = Arc::new(RecordingToastSink::new());
    let policy = ReconnectPolicy {
        auto_reconnect: true,
        reconnect_interval: Duration::from_millis(10),
        max_reconnect_attempts: 2,
    };
    let client = NotificationClient::new(format!("ws://{}", addr), policy, Arc::new(WsConnector), toasts.clone());

    let outcome = tokio::time::timeout(Duration::from_secs(10), client.run()).await??;
    assert_eq!(outcome, RunOutcome::GaveUp);

    let titles: Vec<String> = toasts.toasts().into_iter().map(|t| t.title).collect();
    assert_eq!(titles, vec!["Connection lost", "Connection lost", "Connection error"]);
    Ok(())
}
