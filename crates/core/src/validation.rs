//! Registration input validation: subject syntax, destination URL format,
//! destination count, and de-duplication.

use std::sync::LazyLock;

use regex::{Regex, RegexBuilder};

use crate::error::CoreError;
use crate::hook::{HookKind, NewHook, Subject};

// ---------------------------------------------------------------------------
// Constants
// ---------------------------------------------------------------------------

/// Maximum number of destinations per hook, counted before de-duplication.
pub const MAX_DESTINATIONS: usize = 5;

/// Webhook base used when none is configured.
pub const DEFAULT_DESTINATION_BASE_URL: &str = "https://canary.discordapp.com/api/webhooks";

/// `owner/name`, each segment 1-39 characters.
static REPOSITORY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._-]{1,39}/[A-Za-z0-9._-]{1,39}$").expect("valid regex")
});

/// A single login segment, 1-38 characters.
static ORGANIZATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[A-Za-z0-9._-]{1,38}$").expect("valid regex"));

/// Version 4 UUID in canonical text form.
static HOOK_ID_RE: LazyLock<Regex> = LazyLock::new(|| {
    RegexBuilder::new(r"^[0-9a-f]{8}-[0-9a-f]{4}-4[0-9a-f]{3}-[89ab][0-9a-f]{3}-[0-9a-f]{12}$")
        .case_insensitive(true)
        .build()
        .expect("valid regex")
});

const REPOSITORY_MESSAGE: &str =
    "\"repository\" must be a string in the following format: username/repository-name";
const ORGANIZATION_MESSAGE: &str = "\"organization\" must be a valid GitHub username string";
const DESTINATION_COUNT_MESSAGE: &str = "\"destinations\" must be an array of 1-5 webhook URLs";
const DESTINATION_FORMAT_MESSAGE: &str =
    "\"destinations\" must only contain valid webhook URLs (without /slack)";

// ---------------------------------------------------------------------------
// DestinationPattern
// ---------------------------------------------------------------------------

/// Matcher for the chat platform's webhook URL scheme:
/// `<base>/<16-21 digit id>/<68 character token>`.
#[derive(Debug, Clone)]
pub struct DestinationPattern {
    base: String,
    regex: Regex,
}

impl DestinationPattern {
    /// Build a pattern for the given webhook base URL. A trailing slash on
    /// the base is ignored.
    pub fn new(base_url: &str) -> Result<Self, CoreError> {
        let base = base_url.trim_end_matches('/').to_string();
        let pattern = format!(
            r"^{}/[0-9]{{16,21}}/[a-z0-9_.-]{{68}}$",
            regex::escape(&base)
        );
        let regex = RegexBuilder::new(&pattern)
            .case_insensitive(true)
            .build()
            .map_err(|e| CoreError::Internal(format!("Invalid destination base URL: {e}")))?;
        Ok(Self { base, regex })
    }

    pub fn base_url(&self) -> &str {
        &self.base
    }

    pub fn is_match(&self, url: &str) -> bool {
        self.regex.is_match(url)
    }
}

impl Default for DestinationPattern {
    fn default() -> Self {
        Self::new(DEFAULT_DESTINATION_BASE_URL).expect("default destination base is valid")
    }
}

// ---------------------------------------------------------------------------
// Validation
// ---------------------------------------------------------------------------

/// Check a subject name against the kind-specific syntax.
pub fn is_valid_subject(kind: HookKind, name: &str) -> bool {
    match kind {
        HookKind::Repository => REPOSITORY_RE.is_match(name),
        HookKind::Organization => ORGANIZATION_RE.is_match(name),
    }
}

/// Check that a presented hook id has the canonical identifier syntax.
pub fn is_valid_hook_id(id: &str) -> bool {
    HOOK_ID_RE.is_match(id)
}

/// Validate a registration request and collapse duplicate destinations.
///
/// Every problem is collected so the caller gets the full list at once.
/// The destination count is checked on the raw list, so six copies of the
/// same URL are still rejected.
pub fn validate_registration(
    kind: HookKind,
    subject: Option<&str>,
    destinations: Option<&[String]>,
    pattern: &DestinationPattern,
) -> Result<NewHook, CoreError> {
    let mut errors = Vec::new();

    let subject = subject.filter(|name| is_valid_subject(kind, name));
    if subject.is_none() {
        errors.push(
            match kind {
                HookKind::Repository => REPOSITORY_MESSAGE,
                HookKind::Organization => ORGANIZATION_MESSAGE,
            }
            .to_string(),
        );
    }

    match destinations {
        Some(urls) if !urls.is_empty() && urls.len() <= MAX_DESTINATIONS => {
            if !urls.iter().all(|url| pattern.is_match(url)) {
                errors.push(DESTINATION_FORMAT_MESSAGE.to_string());
            }
        }
        _ => errors.push(DESTINATION_COUNT_MESSAGE.to_string()),
    }

    match (subject, destinations) {
        (Some(name), Some(urls)) if errors.is_empty() => Ok(NewHook {
            subject: Subject::new(kind, name),
            destinations: dedup_destinations(urls),
        }),
        _ => Err(CoreError::Validation { errors }),
    }
}

/// Remove repeated URLs, keeping the first occurrence of each. URLs are
/// compared ignoring ASCII case, like the destination pattern.
pub fn dedup_destinations(urls: &[String]) -> Vec<String> {
    let mut unique: Vec<String> = Vec::with_capacity(urls.len());
    for url in urls {
        if !unique.iter().any(|seen| seen.eq_ignore_ascii_case(url)) {
            unique.push(url.clone());
        }
    }
    unique
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
