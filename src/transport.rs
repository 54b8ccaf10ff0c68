//! Network transport for the Web API and the realtime websocket
//!
//! The client never talks to the network directly. It goes through a [`Transport`]:
//! one JSON POST per Web API call, and one stream of decoded JSON messages per
//! realtime session. [`HttpTransport`] is the production implementation (reqwest for
//! HTTP, tokio-tungstenite for the websocket). Tests substitute an in-memory
//! implementation.
//!
//! Decoding bytes into [`serde_json::Value`] is the transport's job. Everything above
//! this layer works on already-decoded JSON.

use crate::{Error, Result};
use async_trait::async_trait;
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, Stream, StreamExt};
use serde_json::Value;
use std::pin::Pin;
use std::time::Duration;
use tokio_tungstenite::tungstenite::Message;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};

/// Status and decoded body of one Web API response.
#[derive(Debug, Clone, PartialEq)]
pub struct HttpReply {
    pub status: u16,
    /// Decoded JSON body. Non-JSON bodies of failed requests are kept as a string.
    pub body: Value,
}

impl HttpReply {
    pub fn new(status: u16, body: Value) -> Self {
        Self { status, body }
    }

    /// A `200 OK` reply.
    pub fn ok(body: Value) -> Self {
        Self::new(200, body)
    }
}

/// Stream of decoded realtime messages, in arrival order.
///
/// The stream ends when the socket closes. It does not interpret the messages; the
/// `goodbye` sentinel is handled by [`RtmStream`](crate::RtmStream).
pub type MessageStream = Pin<Box<dyn Stream<Item = Result<Value>> + Send>>;

/// The two network operations the client needs.
#[async_trait]
pub trait Transport: Send + Sync {
    /// POST `body` as JSON to `url`, authenticated with `token`.
    ///
    /// Any completed exchange is `Ok`, whatever its status; interpreting the status is
    /// up to the caller.
    async fn post(&self, url: &str, token: &str, body: &Value) -> Result<HttpReply>;

    /// Open a realtime connection to `url`.
    async fn connect(&self, url: &str) -> Result<MessageStream>;
}

type WsStream = WebSocketStream<MaybeTlsStream<tokio::net::TcpStream>>;

/// [`Transport`] over reqwest and tokio-tungstenite.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    http_client: reqwest::Client,
}

impl HttpTransport {
    /// Create a transport whose HTTP requests time out after `timeout` seconds.
    ///
    /// The timeout does not apply to the realtime connection, which stays open until
    /// the server closes it or the stream is dropped.
    pub fn new(timeout: u64) -> Result<Self> {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(timeout))
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { http_client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn post(&self, url: &str, token: &str, body: &Value) -> Result<HttpReply> {
        let response = self
            .http_client
            .post(url)
            .header("Authorization", format!("Bearer {}", token))
            .header("Content-Type", "application/json")
            .json(body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    Error::timeout()
                } else {
                    Error::Http(e)
                }
            })?;

        let status = response.status();
        let text = response.text().await.map_err(Error::Http)?;

        let body = if status.is_success() {
            serde_json::from_str(&text)?
        } else {
            // Error pages are not always JSON
            serde_json::from_str(&text).unwrap_or(Value::String(text))
        };

        Ok(HttpReply::new(status.as_u16(), body))
    }

    async fn connect(&self, url: &str) -> Result<MessageStream> {
        let (ws_stream, _resp) = connect_async(url).await?;
        log::debug!("realtime connection open to {}", url);

        let (write, read) = ws_stream.split();
        Ok(Box::pin(websocket_messages(write, read)))
    }
}

/// Decode websocket frames into JSON values.
///
/// Pings are answered in place. A close frame or the end of the socket ends the
/// stream; a read error is yielded once and then ends it.
fn websocket_messages(
    write: SplitSink<WsStream, Message>,
    read: SplitStream<WsStream>,
) -> impl Stream<Item = Result<Value>> + Send {
    futures::stream::unfold(Some((write, read)), |state| async move {
        let (mut write, mut read) = match state {
            Some(halves) => halves,
            None => return None,
        };
        loop {
            let msg = match read.next().await {
                Some(Ok(msg)) => msg,
                Some(Err(e)) => return Some((Err(Error::from(e)), None)),
                None => return None,
            };

            match msg {
                Message::Text(text) => {
                    let value = serde_json::from_str::<Value>(&text).map_err(Error::from);
                    return Some((value, Some((write, read))));
                }
                Message::Binary(bytes) => {
                    let value = String::from_utf8(bytes)
                        .map_err(|e| Error::websocket(e.to_string()))
                        .and_then(|s| serde_json::from_str::<Value>(&s).map_err(Error::from));
                    return Some((value, Some((write, read))));
                }
                Message::Ping(payload) => {
                    if let Err(e) = write.send(Message::Pong(payload)).await {
                        return Some((Err(Error::from(e)), None));
                    }
                }
                Message::Close(frame) => {
                    log::debug!("realtime connection closed: {:?}", frame);
                    return None;
                }
                _ => {}
            }
        }
    })
}
