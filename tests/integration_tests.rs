//! Integration tests for the aioslack client
//!
//! These tests drive the public API end to end over an in-memory transport.

use aioslack::types::{CHANNEL, GROUP, USER};
use aioslack::{Error, HttpReply, MessageStream, Result, Slack, SlackOptions, Transport};
use async_trait::async_trait;
use futures::StreamExt;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Canned replies keyed by method name, plus a fixed list of realtime messages.
#[derive(Default)]
struct FakeSlack {
    replies: HashMap<String, HttpReply>,
    messages: Vec<Value>,
    calls: Mutex<Vec<String>>,
}

impl FakeSlack {
    fn with_reply(mut self, method: &str, body: Value) -> Self {
        self.replies.insert(method.to_string(), HttpReply::ok(body));
        self
    }

    fn with_messages(mut self, messages: Vec<Value>) -> Self {
        self.messages = messages;
        self
    }
}

#[async_trait]
impl Transport for FakeSlack {
    async fn post(&self, url: &str, _token: &str, _body: &Value) -> Result<HttpReply> {
        let method = url.rsplit('/').next().unwrap_or_default().to_string();
        self.calls.lock().unwrap().push(method.clone());
        self.replies
            .get(&method)
            .cloned()
            .ok_or_else(|| Error::other(format!("unexpected call to {}", method)))
    }

    async fn connect(&self, _url: &str) -> Result<MessageStream> {
        Ok(futures::stream::iter(self.messages.clone().into_iter().map(Ok)).boxed())
    }
}

fn rtm_start_body() -> Value {
    json!({
        "ok": true,
        "url": "wss://cerberus.example/websocket/abc",
        "self": {"id": "U0BOT", "name": "bot", "prefs": {"highlight_words": ""}},
        "team": {"id": "T024BE7LD", "name": "Example", "domain": "example"},
        "channels": [
            {
                "id": "c1",
                "name": "general",
                "is_channel": true,
                "is_general": true,
                "members": ["U0BOT", "U023BECGF"],
                "topic": {"value": "Company-wide", "creator": "U023BECGF", "last_set": 1360782804},
                "purpose": {"value": "", "creator": "", "last_set": 0},
                "is_frozen": false
            },
            {"id": "c2", "name": "random", "is_channel": true}
        ],
        "users": [
            {"id": "U0BOT", "name": "bot", "is_bot": true},
            {"id": "U023BECGF", "name": "bobby", "profile": {"real_name": "Bobby Tables"}}
        ],
        "groups": [{"id": "G1", "name": "secret", "is_group": true}],
        "ims": [{"id": "D1", "is_im": true, "user": "U023BECGF"}]
    })
}

fn slack(fake: FakeSlack) -> (Slack, Arc<FakeSlack>) {
    let fake = Arc::new(fake);
    let options = SlackOptions::builder().token("xoxb-test").build().unwrap();
    (Slack::with_transport(options, fake.clone()), fake)
}

#[tokio::test]
async fn test_session_start_fills_caches() {
    let (mut slack, fake) = slack(FakeSlack::default().with_reply("rtm.start", rtm_start_body()));

    let _stream = slack.rtm_start().await.unwrap();

    assert_eq!(fake.calls.lock().unwrap().as_slice(), ["rtm.start"]);

    let info = slack.info().unwrap();
    assert_eq!(info.name(), "Me");
    assert_eq!(info.str("name"), Some("bot"));
    assert_eq!(slack.team().unwrap().name(), "Team");
    assert_eq!(slack.team().unwrap().str("domain"), Some("example"));

    assert_eq!(slack.channels().len(), 2);
    assert_eq!(slack.users().len(), 2);
    assert_eq!(slack.groups().len(), 1);

    let general = slack.channels().lookup("c1").unwrap();
    assert_eq!(general.str("name"), Some("general"));
    assert!(general.is_instance_of(&CHANNEL));
    assert!(!general.contains("is_frozen"));

    let topic = general.record("topic").unwrap();
    assert_eq!(topic.name(), "Value");
    assert_eq!(topic.str("value"), Some("Company-wide"));
    assert_eq!(topic.i64("last_set"), Some(1360782804));

    let bobby = slack.users().find_by_secondary("bobby").unwrap();
    assert!(bobby.is_instance_of(&USER));
    assert_eq!(bobby.record("profile").unwrap().str("real_name"), Some("Bobby Tables"));

    assert!(slack.groups().lookup("G1").unwrap().is_instance_of(&GROUP));
    assert!(slack.channels().lookup("G1").is_err());
}

#[tokio::test]
async fn test_session_events_update_caches() {
    let (mut slack, _) = slack(
        FakeSlack::default()
            .with_reply("rtm.start", rtm_start_body())
            .with_messages(vec![
                json!({"type": "hello"}),
                json!({
                    "type": "channel_rename",
                    "channel": {"id": "c2", "name": "watercooler", "created": 1}
                }),
                json!({"type": "message", "channel": "c1", "user": "U023BECGF", "text": "hi"}),
                json!({"type": "channel_deleted", "channel": "c1"}),
                json!({"type": "goodbye"}),
                json!({"type": "message", "text": "after goodbye"}),
            ]),
    );

    let mut stream = slack.rtm_start().await.unwrap();

    let mut types = Vec::new();
    while let Some(event) = slack.next_event(&mut stream).await {
        let event = event.unwrap();
        assert_eq!(event.name(), "Event");
        types.push(event.str("type").unwrap_or_default().to_string());
    }

    assert_eq!(types, vec!["hello", "channel_rename", "message", "channel_deleted"]);
    assert!(stream.is_finished());

    let renamed = slack.channels().lookup("c2").unwrap();
    assert_eq!(renamed.str("name"), Some("watercooler"));
    assert_eq!(renamed.bool("is_channel"), Some(true));
    assert!(slack.channels().contains_secondary("watercooler"));

    let err = slack.channels().lookup("c1").unwrap_err();
    assert_eq!(err.to_string(), "Channel c1 not in cache");
}

#[tokio::test]
async fn test_session_start_is_additive() {
    let (mut slack, _) = slack(
        FakeSlack::default()
            .with_reply("rtm.start", rtm_start_body())
            .with_reply(
                "channels.list",
                json!({
                    "ok": true,
                    "channels": [{"id": "c3", "name": "archive", "is_archived": true}]
                }),
            ),
    );

    slack.load_channels().await.unwrap();
    slack.rtm_start().await.unwrap();

    let mut ids: Vec<_> = slack.channels().keys().collect();
    ids.sort();
    assert_eq!(ids, vec!["c1", "c2", "c3"]);
}

#[tokio::test]
async fn test_session_start_error_leaves_caches_empty() {
    let (mut slack, _) = slack(
        FakeSlack::default().with_reply("rtm.start", json!({"ok": false, "error": "invalid_auth"})),
    );

    let err = slack.rtm_start().await.unwrap_err();

    assert!(matches!(err, Error::Api(_)));
    assert_eq!(err.to_string(), "API error: rtm.start failed: invalid_auth");
    assert!(slack.channels().is_empty());
    assert!(slack.info().is_none());
}

#[tokio::test]
async fn test_session_start_malformed_entry_changes_nothing() {
    let mut body = rtm_start_body();
    body["channels"] = json!([{"id": "c1", "name": "general"}, {"id": 5, "name": "broken"}]);
    let (mut slack, fake) = slack(
        FakeSlack::default()
            .with_reply("rtm.start", body)
            .with_reply(
                "users.list",
                json!({"ok": true, "members": [{"id": "U1", "name": "ann"}]}),
            ),
    );
    slack.load_users().await.unwrap();

    let err = slack.rtm_start().await.unwrap_err();

    assert!(matches!(err, Error::InvalidInput(_)));
    assert!(slack.info().is_none());
    assert!(slack.team().is_none());
    assert!(slack.channels().is_empty());
    assert!(slack.groups().is_empty());
    assert_eq!(slack.users().keys().collect::<Vec<_>>(), vec!["U1"]);
    assert_eq!(slack.users().find_by_secondary("ann").unwrap().str("id"), Some("U1"));
    assert_eq!(fake.calls.lock().unwrap().as_slice(), ["users.list", "rtm.start"]);
}

#[tokio::test]
async fn test_raw_rtm_does_not_touch_caches() {
    let (slack, _) = slack(
        FakeSlack::default()
            .with_reply("rtm.connect", json!({"ok": true, "url": "wss://frob"}))
            .with_messages(vec![
                json!({"type": "hello"}),
                json!({"type": "channel_created", "channel": {"id": "c9", "name": "new"}}),
                json!({"type": "goodbye"}),
            ]),
    );

    let messages: Vec<_> = slack
        .rtm()
        .await
        .unwrap()
        .map(|m| m.unwrap())
        .collect()
        .await;

    assert_eq!(messages.len(), 2);
    assert_eq!(messages[1]["channel"]["name"], json!("new"));
    assert!(slack.channels().is_empty());
}
