//! Realtime session: the start snapshot and the message stream
//!
//! A realtime session begins with a handshake call. `rtm.connect` returns only the
//! websocket URL; `rtm.start` also returns an authoritative snapshot of the
//! workspace, which [`RtmStart::parse`] turns into records ready to fill the caches.
//!
//! After the handshake, [`RtmStream`] yields one decoded message at a time until the
//! server sends `{"type": "goodbye"}` or the socket closes. Messages are pulled one by
//! one: nothing is read ahead while the caller is still processing an event.

use crate::record::{Record, RecordBuilder, json_kind};
use crate::transport::MessageStream;
use crate::types::{CHANNEL, GROUP, IM, MPIM, USER};
use crate::{Error, Result};
use futures::{Stream, StreamExt};
use serde_json::{Map, Value};
use std::pin::Pin;
use std::task::{Context, Poll};

/// Message type the server sends before closing the session.
pub const GOODBYE: &str = "goodbye";

/// Records decoded from an `rtm.start` response.
#[derive(Debug, Clone, PartialEq)]
pub struct RtmStart {
    /// Websocket URL to connect to
    pub url: String,
    /// The authenticated user, as an ad-hoc record named `Me`
    pub info: Record,
    /// The workspace, as an ad-hoc record named `Team`
    pub team: Record,
    pub channels: Vec<Record>,
    pub users: Vec<Record>,
    pub groups: Vec<Record>,
    pub ims: Vec<Record>,
    pub mpims: Vec<Record>,
}

impl RtmStart {
    /// Parse a decoded `rtm.start` body.
    ///
    /// `url` is required. `self` and `team` are generated recursively; a missing one
    /// yields an empty record. Entity lists are built against their declared schemas;
    /// a missing list is empty, and non-object entries are skipped with a diagnostic.
    pub fn parse(data: &Map<String, Value>, builder: &RecordBuilder) -> Result<Self> {
        let url = data
            .get("url")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::invalid_input("rtm.start response has no url"))?
            .to_string();

        Ok(Self {
            url,
            info: adhoc_field(data, "self", "Me")?,
            team: adhoc_field(data, "team", "Team")?,
            channels: builder.build_list(&CHANNEL, list_field(data, "channels")?),
            users: builder.build_list(&USER, list_field(data, "users")?),
            groups: builder.build_list(&GROUP, list_field(data, "groups")?),
            ims: builder.build_list(&IM, list_field(data, "ims")?),
            mpims: builder.build_list(&MPIM, list_field(data, "mpims")?),
        })
    }
}

fn adhoc_field(data: &Map<String, Value>, key: &str, name: &str) -> Result<Record> {
    match data.get(key) {
        Some(Value::Object(inner)) => Ok(Record::generate(inner, name, true)),
        None | Some(Value::Null) => Ok(Record::generate(&Map::new(), name, true)),
        Some(other) => Err(Error::invalid_input(format!(
            "expected an object for {}, got {}",
            key,
            json_kind(other)
        ))),
    }
}

/// The list stored under `key`. A missing key (or null) reads as an empty list.
pub(crate) fn list_field<'a>(data: &'a Map<String, Value>, key: &str) -> Result<&'a [Value]> {
    match data.get(key) {
        Some(Value::Array(values)) => Ok(values.as_slice()),
        None | Some(Value::Null) => Ok(Default::default()),
        Some(other) => Err(Error::invalid_input(format!(
            "expected a list for {}, got {}",
            key,
            json_kind(other)
        ))),
    }
}

/// Realtime messages up to, and not including, the `goodbye` sentinel.
///
/// Implements [`Stream`], so it composes with [`StreamExt`]. Once the sentinel arrives
/// or the socket ends, the stream stays finished.
pub struct RtmStream {
    inner: MessageStream,
    finished: bool,
}

impl RtmStream {
    pub fn new(inner: MessageStream) -> Self {
        Self {
            inner,
            finished: false,
        }
    }

    /// Next message as a JSON object, or `None` at the end of the session.
    ///
    /// A message that is not a JSON object is yielded as
    /// [`Error::InvalidInput`]; the stream continues after it.
    pub async fn next_message(&mut self) -> Option<Result<Map<String, Value>>> {
        self.next().await
    }

    /// Whether the session has ended.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl Stream for RtmStream {
    type Item = Result<Map<String, Value>>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if self.finished {
            return Poll::Ready(None);
        }

        let item = match futures::ready!(self.inner.poll_next_unpin(cx)) {
            Some(item) => item,
            None => {
                log::debug!("realtime stream ended");
                self.finished = true;
                return Poll::Ready(None);
            }
        };

        Poll::Ready(Some(match item {
            Ok(Value::Object(message)) => {
                if message.get("type").and_then(Value::as_str) == Some(GOODBYE) {
                    log::debug!("realtime session said goodbye");
                    self.finished = true;
                    return Poll::Ready(None);
                }
                Ok(message)
            }
            Ok(other) => Err(Error::invalid_input(format!(
                "expected an object message, got {}",
                json_kind(&other)
            ))),
            Err(e) => Err(e),
        }))
    }
}

impl std::fmt::Debug for RtmStream {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RtmStream")
            .field("finished", &self.finished)
            .finish_non_exhaustive()
    }
}
