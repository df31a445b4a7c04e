use crate::domain::ports::{Connection, Connector};
use crate::utils::error::Result;
use async_trait::async_trait;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio_tungstenite::tungstenite::{self, Message};
use tokio_tungstenite::{connect_async, MaybeTlsStream, WebSocketStream};

/// `Connector` over tokio-tungstenite (ws:// and wss://).
#[derive(Debug, Clone, Copy, Default)]
pub struct WsConnector;

#[async_trait]
impl Connector for WsConnector {
    async fn connect(&self, url: &str) -> Result<Box<dyn Connection>> {
        tracing::debug!("Opening WebSocket to {}", url);
        let (stream, response) = connect_async(url).await?;
        tracing::debug!("WebSocket handshake status: {}", response.status());
        Ok(Box::new(WsConnection { stream }))
    }
}

struct WsConnection {
    stream: WebSocketStream<MaybeTlsStream<TcpStream>>,
}

#[async_trait]
impl Connection for WsConnection {
    async fn recv(&mut self) -> Option<String> {
        while let Some(frame) = self.stream.next().await {
            match frame {
                Ok(Message::Text(text)) => return Some(text),
                Ok(Message::Binary(bytes)) => match String::from_utf8(bytes) {
                    Ok(text) => return Some(text),
                    Err(_) => tracing::warn!("Dropping non UTF-8 binary frame"),
                },
                Ok(Message::Close(frame)) => {
                    tracing::debug!("Server closed the WebSocket: {:?}", frame);
                    return None;
                }
                // ping/pong are answered by tungstenite itself
                Ok(_) => continue,
                Err(e) => {
                    tracing::error!("WebSocket error: {}", e);
                    return None;
                }
            }
        }
        None
    }

    async fn send(&mut self, text: String) -> Result<()> {
        self.stream.send(Message::Text(text)).await?;
        Ok(())
    }

    async fn close(&mut self) -> Result<()> {
        match self.stream.close(None).await {
            Ok(()) => Ok(()),
            Err(tungstenite::Error::ConnectionClosed) | Err(tungstenite::Error::AlreadyClosed) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::error::RentalError;

    #[test]
    fn test_refused_connection_is_a_socket_error() {
        let result = tokio_test::block_on(async {
            let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
            let addr = listener.local_addr()?;
            drop(listener);
            Ok::<_, std::io::Error>(WsConnector.connect(&format!("ws://{}", addr)).await)
        });

        match result {
            Ok(Err(RentalError::SocketError(_))) => {}
            Ok(Err(other)) => panic!("unexpected error: {}", other),
            Ok(Ok(_)) => panic!("connection should have been refused"),
            Err(e) => panic!("test setup failed: {}", e),
        }
    }
}
