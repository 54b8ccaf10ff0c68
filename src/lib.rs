//! # aioslack
//!
//! An async client for Slack's Web API and realtime messaging (RTM) API, built
//! around a dynamic record model and typed local entity caches.
//!
//! ## Overview
//!
//! Responses and events arrive as arbitrary nested JSON. Rather than declaring a Rust
//! struct per endpoint, the crate turns them into [`Record`]s:
//!
//! - **Ad-hoc records** ([`Record::generate`]) take their fields from whatever keys
//!   the payload carries. Used for API responses and realtime events, whose shape
//!   varies by endpoint and event type.
//! - **Declared records** ([`Schema::build`]) follow a static schema from
//!   [`types`]: missing fields get defaults, unknown fields are reported to a
//!   [`Diagnostics`] sink and dropped. Used for the entities the client caches.
//!
//! Declared channels, users and groups are kept in [`Cache`]s, filled from
//! `rtm.start` and the `*.list` endpoints and updated from realtime events.
//!
//! ## Key Features
//!
//! - **Tolerant decoding**: new upstream fields never break record building
//! - **Type-checked caches**: a cache only ever holds records of its own schema
//! - **Realtime streaming**: events as a `futures::Stream`, ending at `goodbye`
//! - **Pluggable transport**: swap the network layer out for tests
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use aioslack::{Slack, SlackOptions};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let options = SlackOptions::builder()
//!         .token(aioslack::get_token(None).unwrap_or_default())
//!         .diagnostics(aioslack::Diagnostics::log())
//!         .build()?;
//!
//!     let mut slack = Slack::new(options)?;
//!     let mut stream = slack.rtm_start().await?;
//!
//!     let general = slack.channels().find_by_secondary("general");
//!     println!("general is {:?}", general.and_then(|c| c.str("id")));
//!
//!     while let Some(event) = slack.next_event(&mut stream).await {
//!         let event = event?;
//!         println!("{}", event.to_json());
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - **record**: ad-hoc and declared records, and the builder that produces them
//! - **schema**: static schema descriptors for declared records
//! - **types**: the declared entity catalogue and client options
//! - **cache**: keyed, type-checked stores of declared records
//! - **diagnostics**: non-fatal reports from record building
//! - **client**: the Web API and realtime client
//! - **session**: `rtm.start` snapshot parsing and the realtime message stream
//! - **transport**: HTTP and websocket plumbing behind a trait
//! - **config**: environment variable helpers
//! - **error**: the error enum and `Result` alias

// ============================================================================
// MODULE DECLARATIONS
// ============================================================================
// These modules are private (internal implementation details) unless explicitly
// re-exported through `pub use` statements below.

/// Typed entity caches with type-checked writes, bulk fill, and a secondary index.
mod cache;

/// Slack client: Web API calls, realtime sessions, and cache maintenance.
mod client;

/// Environment variable helpers for the token and endpoint.
mod config;

/// Non-fatal diagnostics sink injected into the record builder.
mod diagnostics;

/// Error types and conversions used across all public APIs.
mod error;

/// Ad-hoc and declared records built from decoded JSON.
mod record;

/// Realtime session start snapshot and the goodbye-terminated message stream.
mod session;

/// Transport trait and its reqwest/tokio-tungstenite implementation.
mod transport;

// ============================================================================
// PUBLIC EXPORTS
// ============================================================================
// These items form the public API of the crate. Everything else is internal.

/// Schema descriptors, public so callers can declare their own record types.
pub mod schema;

/// The declared entity catalogue (`CHANNEL`, `USER`, ...) and client options.
pub mod types;

// --- Client ---

pub use client::{EVENT_RECORD_NAME, RESPONSE_RECORD_NAME, Slack};

// --- Configuration ---

pub use config::{BASE_URL_ENV, DEFAULT_BASE_URL, TOKEN_ENV, get_base_url, get_token};
pub use types::{SlackOptions, SlackOptionsBuilder};

// --- Error Handling ---

pub use error::{Error, Result};

// --- Record Model ---

pub use diagnostics::{Diagnostic, DiagnosticHandler, Diagnostics};
pub use record::{DEFAULT_RECORD_NAME, Field, Record, RecordBuilder, title_case};
pub use schema::{DefaultValue, FieldSpec, FieldType, Schema};

// --- Entity Cache ---

pub use cache::{Cache, DEFAULT_KEY_FIELD};

// --- Realtime & Transport ---

pub use session::{GOODBYE, RtmStart, RtmStream};
pub use transport::{HttpReply, HttpTransport, MessageStream, Transport};

// ============================================================================
// CONVENIENCE PRELUDE
// ============================================================================

/// Convenience module containing the most commonly used types.
/// Import with `use aioslack::prelude::*;`.
///
/// This includes:
/// - Client: Slack, SlackOptions
/// - Records: Record, Field, RecordBuilder, Schema
/// - Caches: Cache
/// - Errors: Error, Result
pub mod prelude {
    pub use crate::{
        Cache, Diagnostics, Error, Field, Record, RecordBuilder, Result, RtmStream, Schema, Slack,
        SlackOptions,
    };
}
