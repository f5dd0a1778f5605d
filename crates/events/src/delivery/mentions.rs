use std::sync::LazyLock;

use regex::Regex;

static EVERYONE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)@everyone").expect("valid regex"));

static HERE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"(?i)@here").expect("valid regex"));

/// Replace `@everyone` and `@here` (any case) with a bracketed spelling the
/// platform does not treat as a mass mention.
pub fn neutralize_mentions(message: &str) -> String {
    let message = EVERYONE_RE.replace_all(message, "[at]everyone");
    HERE_RE.replace_all(&message, "[at]here").into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn replaces_both_tokens_in_any_case() {
        assert_eq!(
            neutralize_mentions("ping @everyone and @HERE, also @EveryOne"),
            "ping [at]everyone and [at]here, also [at]everyone"
        );
    }

    #[test]
    fn leaves_other_mentions_alone() {
        assert_eq!(neutralize_mentions("thanks @octocat"), "thanks @octocat");
        assert_eq!(neutralize_mentions("where is it"), "where is it");
    }

    #[test]
    fn handles_tokens_inside_words() {
        assert_eq!(neutralize_mentions("x@herey"), "x[at]herey");
    }
}
