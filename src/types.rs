//! Core types: client options and the declared entity schemas
//!
//! The schemas follow the platform's object type documentation
//! (<https://api.slack.com/types>). Fields the platform adds later are dropped by
//! [`RecordBuilder::build`](crate::RecordBuilder::build) with a diagnostic, so these
//! tables only need the fields the crate (and its callers) read.

use crate::diagnostics::Diagnostics;
use crate::schema::{DefaultValue, FieldSpec, Schema};

/// Topic and purpose of channels and groups.
pub static VALUE: Schema = Schema {
    name: "Value",
    fields: &[
        FieldSpec::string("value"),
        FieldSpec::string("creator"),
        FieldSpec::integer("last_set"),
    ],
};

pub static CHANNEL: Schema = Schema {
    name: "Channel",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::string("name"),
        FieldSpec::boolean("is_channel"),
        FieldSpec::integer("created"),
        FieldSpec::string("creator"),
        FieldSpec::boolean("is_archived"),
        FieldSpec::boolean("is_general"),
        FieldSpec::string("name_normalized"),
        FieldSpec::boolean("is_shared"),
        FieldSpec::boolean("is_org_shared"),
        FieldSpec::boolean("is_member"),
        FieldSpec::boolean("is_private"),
        FieldSpec::boolean("is_mpim"),
        FieldSpec::string("last_read"),
        FieldSpec::generic("latest"),
        FieldSpec::integer("unread_count"),
        FieldSpec::integer("unread_count_display"),
        FieldSpec::string_list("members"),
        FieldSpec::nested("topic", &VALUE),
        FieldSpec::nested("purpose", &VALUE),
        FieldSpec::string_list("previous_names"),
    ],
};

pub static CONVERSATION: Schema = Schema {
    name: "Conversation",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::string("name"),
        FieldSpec::boolean("is_channel"),
        FieldSpec::boolean("is_group"),
        FieldSpec::boolean("is_im"),
        FieldSpec::integer("created"),
        FieldSpec::string("creator"),
        FieldSpec::boolean("is_archived"),
        FieldSpec::boolean("is_general"),
        FieldSpec::integer("unlinked"),
        FieldSpec::string("name_normalized"),
        FieldSpec::boolean("is_read_only"),
        FieldSpec::boolean("is_shared"),
        FieldSpec::boolean("is_ext_shared"),
        FieldSpec::boolean("is_org_shared"),
        FieldSpec::list("pending_shared"),
        FieldSpec::boolean("is_pending_ext_shared"),
        FieldSpec::boolean("is_member"),
        FieldSpec::boolean("is_private"),
        FieldSpec::boolean("is_mpim"),
        FieldSpec::string("last_read"),
        FieldSpec::nested("topic", &VALUE),
        FieldSpec::nested("purpose", &VALUE),
        FieldSpec::string_list("previous_names"),
        FieldSpec::integer("num_members"),
        FieldSpec::string("locale"),
    ],
};

/// Envelope of an Events API callback.
pub static EVENT: Schema = Schema {
    name: "Event",
    fields: &[
        FieldSpec::string("token"),
        FieldSpec::string("team_id"),
        FieldSpec::string("api_app_id"),
        FieldSpec::generic("event"),
        FieldSpec::string("type"),
        FieldSpec::string_list("authed_users"),
        FieldSpec::string("event_id"),
        FieldSpec::integer("event_time"),
    ],
};

pub static FILE: Schema = Schema {
    name: "File",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::integer("created"),
        FieldSpec::integer("timestamp"),
        FieldSpec::string("name"),
        FieldSpec::string("title"),
        FieldSpec::string("mimetype"),
        FieldSpec::string("filetype"),
        FieldSpec::string("pretty_type"),
        FieldSpec::string("user"),
        FieldSpec::string("mode"),
        FieldSpec::boolean("editable"),
        FieldSpec::boolean("is_external"),
        FieldSpec::string("external_type"),
        FieldSpec::string("username"),
        FieldSpec::integer("size"),
        FieldSpec::string("url_private"),
        FieldSpec::string("url_private_download"),
        FieldSpec::string("thumb_64"),
        FieldSpec::string("thumb_80"),
        FieldSpec::string("thumb_360"),
        FieldSpec::string("thumb_360_gif"),
        FieldSpec::integer("thumb_360_w"),
        FieldSpec::integer("thumb_360_h"),
        FieldSpec::string("thumb_480"),
        FieldSpec::integer("thumb_480_w"),
        FieldSpec::integer("thumb_480_h"),
        FieldSpec::string("thumb_160"),
        FieldSpec::string("permalink"),
        FieldSpec::string("permalink_public"),
        FieldSpec::string("edit_link"),
        FieldSpec::string("preview"),
        FieldSpec::string("preview_highlight"),
        FieldSpec::integer("lines"),
        FieldSpec::integer("lines_more"),
        FieldSpec::boolean("is_public"),
        FieldSpec::boolean("public_url_shared"),
        FieldSpec::boolean("display_as_bot"),
        FieldSpec::string_list("channels"),
        FieldSpec::string_list("groups"),
        FieldSpec::string_list("ims"),
        FieldSpec::generic("initial_comment"),
        FieldSpec::integer("num_stars"),
        FieldSpec::boolean("is_starred"),
        FieldSpec::string_list("pinned_to"),
        FieldSpec::list("reactions"),
        FieldSpec::integer("comments_count"),
    ],
};

/// Private channel.
pub static GROUP: Schema = Schema {
    name: "Group",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::string("name"),
        FieldSpec::boolean("is_group"),
        FieldSpec::integer("created"),
        FieldSpec::string("creator"),
        FieldSpec::boolean("is_archived"),
        FieldSpec::boolean("is_mpim"),
        FieldSpec::string_list("members"),
        FieldSpec::nested("topic", &VALUE),
        FieldSpec::nested("purpose", &VALUE),
        FieldSpec::string("last_read"),
        FieldSpec::generic("latest"),
        FieldSpec::integer("unread_count"),
        FieldSpec::integer("unread_count_display"),
    ],
};

/// Direct message conversation.
pub static IM: Schema = Schema {
    name: "IM",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::boolean("is_im"),
        FieldSpec::string("user"),
        FieldSpec::integer("created"),
        FieldSpec::boolean("is_user_deleted"),
    ],
};

/// Multi-party direct message conversation.
pub static MPIM: Schema = Schema {
    name: "MPIM",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::string("name"),
        FieldSpec::boolean("is_mpim"),
        FieldSpec::boolean("is_group"),
        FieldSpec::integer("created"),
        FieldSpec::string("creator"),
        FieldSpec::string_list("members"),
        FieldSpec::string("last_read"),
        FieldSpec::generic("latest"),
        FieldSpec::integer("unread_count"),
        FieldSpec::integer("unread_count_display"),
    ],
};

pub static PROFILE: Schema = Schema {
    name: "Profile",
    fields: &[
        FieldSpec::string("avatar_hash"),
        FieldSpec::string("status_text"),
        FieldSpec::string("status_emoji"),
        FieldSpec::string("real_name"),
        FieldSpec::string("display_name"),
        FieldSpec::string("real_name_normalized"),
        FieldSpec::string("display_name_normalized"),
        FieldSpec::string("email"),
        FieldSpec::string("image_24"),
        FieldSpec::string("image_32"),
        FieldSpec::string("image_48"),
        FieldSpec::string("image_72"),
        FieldSpec::string("image_192"),
        FieldSpec::string("image_512"),
        FieldSpec::string("team"),
    ],
};

pub static USER: Schema = Schema {
    name: "User",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::string("team_id"),
        FieldSpec::string("name"),
        FieldSpec::boolean("deleted"),
        FieldSpec::string("color"),
        FieldSpec::string("real_name"),
        FieldSpec::string("tz"),
        FieldSpec::string("tz_label"),
        FieldSpec::integer("tz_offset"),
        FieldSpec::nested("profile", &PROFILE),
        FieldSpec::boolean("is_admin"),
        FieldSpec::boolean("is_owner"),
        FieldSpec::boolean("is_primary_owner"),
        FieldSpec::boolean("is_restricted"),
        FieldSpec::boolean("is_ultra_restricted"),
        FieldSpec::boolean("is_bot"),
        FieldSpec::boolean("is_stranger"),
        FieldSpec::integer("updated"),
        FieldSpec::boolean("is_app_user"),
        FieldSpec::boolean("has_2fa"),
        FieldSpec::string("locale"),
    ],
};

pub static USER_GROUP: Schema = Schema {
    name: "UserGroup",
    fields: &[
        FieldSpec::string("id").with_default(DefaultValue::Null),
        FieldSpec::string("team_id"),
        FieldSpec::boolean("is_usergroup"),
        FieldSpec::string("name"),
        FieldSpec::string("description"),
        FieldSpec::string("handle"),
        FieldSpec::boolean("is_external"),
        FieldSpec::integer("date_create"),
        FieldSpec::integer("date_update"),
        FieldSpec::integer("date_delete"),
        FieldSpec::string("auto_type"),
        FieldSpec::string("created_by"),
        FieldSpec::string("updated_by"),
        FieldSpec::string("deleted_by"),
        FieldSpec::generic("prefs"),
        FieldSpec::string_list("users"),
        FieldSpec::string("user_count"),
    ],
};

/// Options for configuring a [`Slack`](crate::Slack) client
#[derive(Clone)]
pub struct SlackOptions {
    /// Bearer token (`xoxb-...` or `xoxp-...`)
    pub token: String,

    /// Web API endpoint, without a trailing slash
    pub base_url: String,

    /// Request timeout in seconds
    pub timeout: u64,

    /// Sink for non-fatal record building diagnostics
    pub diagnostics: Diagnostics,
}

impl std::fmt::Debug for SlackOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackOptions")
            .field("token", &"***")
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .field("diagnostics", &self.diagnostics)
            .finish()
    }
}

impl SlackOptions {
    /// Create a new builder for SlackOptions
    pub fn builder() -> SlackOptionsBuilder {
        SlackOptionsBuilder::default()
    }

    /// Options for `token` with every other setting at its default.
    pub fn with_token(token: impl Into<String>) -> crate::Result<Self> {
        Self::builder().token(token).build()
    }
}

/// Builder for SlackOptions
#[derive(Default)]
pub struct SlackOptionsBuilder {
    token: Option<String>,
    base_url: Option<String>,
    timeout: Option<u64>,
    diagnostics: Option<Diagnostics>,
}

impl std::fmt::Debug for SlackOptionsBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SlackOptionsBuilder")
            .field("token", &self.token.as_ref().map(|_| "***"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl SlackOptionsBuilder {
    pub fn token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = Some(url.into());
        self
    }

    pub fn timeout(mut self, timeout: u64) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn diagnostics(mut self, diagnostics: Diagnostics) -> Self {
        self.diagnostics = Some(diagnostics);
        self
    }

    pub fn build(self) -> crate::Result<SlackOptions> {
        let token = self
            .token
            .filter(|t| !t.trim().is_empty())
            .ok_or_else(|| crate::Error::config("token is required"))?;

        let base_url = self
            .base_url
            .unwrap_or_else(|| crate::config::DEFAULT_BASE_URL.to_string())
            .trim_end_matches('/')
            .to_string();

        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(crate::Error::config(format!(
                "base_url must be an http(s) URL, got {base_url}"
            )));
        }

        Ok(SlackOptions {
            token,
            base_url,
            timeout: self.timeout.unwrap_or(30),
            diagnostics: self.diagnostics.unwrap_or_default(),
        })
    }
}
