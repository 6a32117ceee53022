//! Requested-name classification.
//!
//! Every name that reaches the resolver, whether through `load` or through a
//! component's `require`, is either the exact name of a component or a
//! pattern expression:
//!
//! - `all!<regex>`: every matching component, keyed by name
//! - `any!<regex>`: every matching component, as a list
//! - `container!`: the container itself
//!
//! Expressions never become dependency-graph nodes.

use std::fmt;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::error::{Error, Result};

static EXPRESSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^([A-Za-z_][A-Za-z0-9_]*)!(.*)$").expect("expression grammar is a valid regex")
});

/// A classified name.
///
/// # Examples
/// ```
/// use compono_container::key::Key;
///
/// assert_eq!(Key::parse("services/foo"), Key::Component("services/foo"));
/// assert_eq!(Key::parse("all!^middleware/"), Key::All("^middleware/"));
/// assert_eq!(Key::parse("container!"), Key::Container);
/// assert!(Key::parse("any!.*/model").is_expression());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Key<'a> {
    /// Exact component name.
    Component(&'a str),
    /// `all!<regex>`
    All(&'a str),
    /// `any!<regex>`
    Any(&'a str),
    /// `container!`
    Container,
    /// `<prefix>!...` with an unsupported prefix, or `container!` with a body.
    Unknown { prefix: &'a str },
}

impl<'a> Key<'a> {
    /// Classifies a requested name.
    pub fn parse(name: &'a str) -> Self {
        let Some(caps) = EXPRESSION.captures(name) else {
            return Key::Component(name);
        };
        let (Some(prefix), Some(body)) = (caps.get(1), caps.get(2)) else {
            return Key::Component(name);
        };

        match prefix.as_str() {
            "all" => Key::All(body.as_str()),
            "any" => Key::Any(body.as_str()),
            "container" if body.as_str().is_empty() => Key::Container,
            other => Key::Unknown { prefix: other },
        }
    }

    /// Returns `true` for anything but a plain component name.
    #[inline]
    pub fn is_expression(&self) -> bool {
        !matches!(self, Key::Component(_))
    }
}

impl fmt::Display for Key<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Component(name) => write!(f, "{name}"),
            Key::All(pattern) => write!(f, "all!{pattern}"),
            Key::Any(pattern) => write!(f, "any!{pattern}"),
            Key::Container => write!(f, "container!"),
            Key::Unknown { prefix } => write!(f, "{prefix}!"),
        }
    }
}

/// Compiles the regex of an `all!`/`any!` expression.
///
/// Matching is unanchored: the pattern may match anywhere in a name. An
/// empty pattern matches every name.
pub(crate) fn compile(expression: &str, pattern: &str) -> Result<Regex> {
    Regex::new(pattern).map_err(|source| Error::InvalidPattern {
        expression: expression.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn plain_names() {
        assert_eq!(Key::parse("config"), Key::Component("config"));
        assert_eq!(Key::parse("models/user"), Key::Component("models/user"));
        assert!(!Key::parse("models/user").is_expression());
    }

    #[test]
    fn group_expressions() {
        assert_eq!(Key::parse("all!.*/model"), Key::All(".*/model"));
        assert_eq!(Key::parse("any!^middleware/.*"), Key::Any("^middleware/.*"));
    }

    #[test]
    fn exclamation_inside_regex_is_kept() {
        assert_eq!(Key::parse("all!a!b"), Key::All("a!b"));
    }

    #[test]
    fn container_token() {
        assert_eq!(Key::parse("container!"), Key::Container);
        assert!(Key::Container.is_expression());
    }

    #[test]
    fn container_token_takes_no_body() {
        assert_eq!(Key::parse("container!foo"), Key::Unknown { prefix: "container" });
        assert_eq!(Key::parse("container! "), Key::Unknown { prefix: "container" });
    }

    #[test]
    fn unknown_prefix() {
        assert_eq!(Key::parse("some!thing"), Key::Unknown { prefix: "some" });
        assert!(Key::parse("some!thing").is_expression());
    }

    #[test]
    fn bang_after_path_is_a_name() {
        // prefix must be an identifier
        assert_eq!(Key::parse("models/user!"), Key::Component("models/user!"));
    }

    #[test]
    fn display_round_trips_expressions() {
        assert_eq!(Key::parse("all!x").to_string(), "all!x");
        assert_eq!(Key::Container.to_string(), "container!");
    }

    #[test]
    fn unanchored_match() {
        let re = compile("all!model", "model").unwrap();
        assert!(re.is_match("users/model"));
        assert!(re.is_match("models/user"));
    }

    #[test]
    fn empty_pattern_matches_everything() {
        let re = compile("any!", "").unwrap();
        assert!(re.is_match("anything"));
    }

    #[test]
    fn invalid_pattern() {
        let err = compile("all!(", "(").unwrap_err();
        assert!(matches!(err, Error::InvalidPattern { .. }));
    }
}
