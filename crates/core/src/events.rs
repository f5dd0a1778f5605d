//! Event routing: recognized event kinds, payload subject extraction,
//! per-kind pre-processing, and template selection.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::Value;

use crate::error::CoreError;
use crate::hook::HookKind;
use crate::render::TemplateSet;

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Characters of a commit id shown in messages.
pub const SHORT_SHA_LENGTH: usize = 7;

/// Maximum characters of a commit comment body shown in messages.
pub const COMMENT_PREVIEW_LENGTH: usize = 200;

/// Appended to a comment preview that was cut short.
pub const ELLIPSIS: &str = "...";

/// Hint returned when a push carries no commits.
pub const EMPTY_PUSH_HINT: &str = "Assuming a new branch was made, discarding.";

static LINE_BREAK_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\r?\n|\r").expect("valid regex"));

// ---------------------------------------------------------------------------
// EventKind
// ---------------------------------------------------------------------------

/// Event kinds the relay renders. Anything else is acknowledged and ignored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Push,
    Ping,
    Fork,
    Watch,
    CommitComment,
    Create,
    Delete,
    Member,
    Public,
    Release,
    Status,
}

impl EventKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Push => "push",
            Self::Ping => "ping",
            Self::Fork => "fork",
            Self::Watch => "watch",
            Self::CommitComment => "commit_comment",
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Member => "member",
            Self::Public => "public",
            Self::Release => "release",
            Self::Status => "status",
        }
    }

    /// Parse the event-kind header value. `None` for unrecognized kinds.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "push" => Some(Self::Push),
            "ping" => Some(Self::Ping),
            "fork" => Some(Self::Fork),
            "watch" => Some(Self::Watch),
            "commit_comment" => Some(Self::CommitComment),
            "create" => Some(Self::Create),
            "delete" => Some(Self::Delete),
            "member" => Some(Self::Member),
            "public" => Some(Self::Public),
            "release" => Some(Self::Release),
            "status" => Some(Self::Status),
            _ => None,
        }
    }

    /// The template key for this kind, which for some kinds depends on the
    /// hook kind or a payload field.
    pub fn template_key(&self, hook_kind: HookKind, payload: &Value) -> String {
        let sub_key = |field: &str| payload.get(field).and_then(Value::as_str).unwrap_or("");
        match self {
            Self::Ping => format!("ping_{hook_kind}"),
            Self::Create | Self::Delete => format!("{}_{}", self.as_str(), sub_key("ref_type")),
            Self::Status => format!("status_{}", sub_key("state")),
            _ => self.as_str().to_string(),
        }
    }
}

impl std::fmt::Display for EventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Subject extraction
// ---------------------------------------------------------------------------

/// The subject an inbound payload refers to, for hook resolution.
///
/// Repository hooks match `repository.full_name`. Organization hooks match
/// `organization.login` when the payload names an organization, otherwise
/// the repository owner (`name` on push payloads, `login` elsewhere).
pub fn event_subject(kind: HookKind, payload: &Value) -> Option<&str> {
    match kind {
        HookKind::Repository => text_at(payload, &["repository", "full_name"]),
        HookKind::Organization => text_at(payload, &["organization", "login"])
            .or_else(|| text_at(payload, &["repository", "owner", "name"]))
            .or_else(|| text_at(payload, &["repository", "owner", "login"])),
    }
}

fn text_at<'a>(value: &'a Value, path: &[&str]) -> Option<&'a str> {
    path.iter()
        .try_fold(value, |node, key| node.get(*key))
        .and_then(Value::as_str)
}

// ---------------------------------------------------------------------------
// Routing
// ---------------------------------------------------------------------------

/// What to do with an authenticated inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RouteOutcome {
    /// Deliver `message` to every destination.
    Deliver { event: EventKind, message: String },
    /// Unrecognized kind: acknowledged, not processed.
    Ignored,
    /// Recognized but intentionally dropped before rendering.
    Discarded { hint: &'static str },
}

/// Route an event to its template and render it.
///
/// Unknown kinds return [`RouteOutcome::Ignored`] without touching the
/// templates. A recognized kind whose computed template key has no
/// template fails with [`CoreError::Render`].
pub fn route(
    templates: &TemplateSet,
    hook_kind: HookKind,
    event_kind: &str,
    mut payload: Value,
) -> Result<RouteOutcome, CoreError> {
    let Some(event) = EventKind::parse(event_kind) else {
        tracing::debug!(event_kind, "Ignoring unrecognized event kind");
        return Ok(RouteOutcome::Ignored);
    };

    if event == EventKind::Push && !has_commits(&payload) {
        return Ok(RouteOutcome::Discarded {
            hint: EMPTY_PUSH_HINT,
        });
    }

    match event {
        EventKind::Push => prepare_push(&mut payload),
        EventKind::CommitComment => prepare_commit_comment(&mut payload),
        EventKind::Status => prepare_status(&mut payload),
        _ => {}
    }

    let key = event.template_key(hook_kind, &payload);
    let message = templates.render(&key, &payload)?;
    Ok(RouteOutcome::Deliver { event, message })
}

fn has_commits(payload: &Value) -> bool {
    payload
        .get("commits")
        .and_then(Value::as_array)
        .is_some_and(|commits| !commits.is_empty())
}

fn short_sha(id: &str) -> String {
    id.chars().take(SHORT_SHA_LENGTH).collect()
}

/// Adds `head_commit.sha`, `commits[].short_id`, `commit_count`, `ref_name`.
fn prepare_push(payload: &mut Value) {
    if let Some(head) = payload.get_mut("head_commit").and_then(Value::as_object_mut) {
        if let Some(id) = head.get("id").and_then(Value::as_str) {
            let sha = short_sha(id);
            head.insert("sha".into(), Value::String(sha));
        }
    }

    let mut count = 0;
    if let Some(commits) = payload.get_mut("commits").and_then(Value::as_array_mut) {
        count = commits.len();
        for commit in commits.iter_mut().filter_map(Value::as_object_mut) {
            if let Some(id) = commit.get("id").and_then(Value::as_str) {
                let short = short_sha(id);
                commit.insert("short_id".into(), Value::String(short));
            }
        }
    }

    let ref_name = payload
        .get("ref")
        .and_then(Value::as_str)
        .map(|r| {
            r.strip_prefix("refs/heads/")
                .or_else(|| r.strip_prefix("refs/tags/"))
                .unwrap_or(r)
                .to_string()
        });

    if let Some(obj) = payload.as_object_mut() {
        obj.insert("commit_count".into(), Value::from(count));
        if let Some(ref_name) = ref_name {
            obj.insert("ref_name".into(), Value::String(ref_name));
        }
    }
}

/// Adds `comment.sha` and a single-line, length-capped `comment.message`.
fn prepare_commit_comment(payload: &mut Value) {
    let Some(comment) = payload.get_mut("comment").and_then(Value::as_object_mut) else {
        return;
    };

    if let Some(id) = comment.get("commit_id").and_then(Value::as_str) {
        let sha = short_sha(id);
        comment.insert("sha".into(), Value::String(sha));
    }

    if let Some(body) = comment.get("body").and_then(Value::as_str) {
        let message = comment_preview(body);
        comment.insert("message".into(), Value::String(message));
    }
}

/// Adds `short_sha`.
fn prepare_status(payload: &mut Value) {
    let sha = payload.get("sha").and_then(Value::as_str).map(short_sha);
    if let (Some(sha), Some(obj)) = (sha, payload.as_object_mut()) {
        obj.insert("short_sha".into(), Value::String(sha));
    }
}

/// Collapse line breaks to spaces and cap at [`COMMENT_PREVIEW_LENGTH`]
/// characters, marking truncation with [`ELLIPSIS`].
///
/// Truncation is decided on the raw body, so a `\r\n` pair counts as two
/// characters even though it collapses to one space.
pub fn comment_preview(body: &str) -> String {
    let truncated = body.chars().count() > COMMENT_PREVIEW_LENGTH;
    let collapsed = LINE_BREAK_RE.replace_all(body, " ");
    let mut preview: String = collapsed
        .chars()
        .take(COMMENT_PREVIEW_LENGTH)
        .collect::<String>()
        .trim()
        .to_string();
    if truncated {
        preview.push_str(ELLIPSIS);
    }
    preview
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
