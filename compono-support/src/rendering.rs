//! Text rendering utilities for human-friendly error messages.
//!
//! Provides helpers to format dependency chains, type names,
//! and "did you mean?" suggestions in error output.

/// Renders a dependency chain as a readable string.
///
/// # Examples
/// ```
/// use compono_support::rendering::render_chain;
///
/// let chain = vec!["a", "b", "c", "a"];
/// let rendered = render_chain(&chain);
/// assert_eq!(rendered, "a → b → c → a");
/// ```
pub fn render_chain(chain: &[impl AsRef<str>]) -> String {
    chain
        .iter()
        .map(|s| s.as_ref())
        .collect::<Vec<_>>()
        .join(" → ")
}

/// Renders a list of names as an indented bullet list, one per line.
///
/// ```
/// use compono_support::rendering::render_list;
///
/// assert_eq!(render_list(&["services/foo", "services/bar"]), "\n    - services/foo\n    - services/bar");
/// ```
pub fn render_list(items: &[impl AsRef<str>]) -> String {
    items
        .iter()
        .map(|item| format!("\n    - {}", item.as_ref()))
        .collect()
}

/// Shortens a fully qualified type name for display.
///
/// ```
/// use compono_support::rendering::shorten_type_name;
///
/// let short = shorten_type_name("my_app::services::user::UserService");
/// assert_eq!(short, "UserService");
///
/// let short = shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>");
/// assert_eq!(short, "Arc<dyn Logger>");
/// ```
pub fn shorten_type_name(full_name: &str) -> String {
    let mut result = String::with_capacity(full_name.len());
    let mut chars = full_name.chars().peekable();
    let mut current_segment = String::new();

    while let Some(ch) = chars.next() {
        match ch {
            ':' if chars.peek() == Some(&':') => {
                chars.next();
                current_segment.clear();
            }
            '<' | '>' | ',' | ' ' => {
                result.push_str(&current_segment);
                result.push(ch);
                current_segment.clear();
            }
            _ => {
                current_segment.push(ch);
            }
        }
    }

    result.push_str(&current_segment);
    result
}

/// Last `/`-separated segment of a component name.
fn leaf(name: &str) -> &str {
    name.rsplit('/').next().unwrap_or(name)
}

/// Generates "did you mean?" suggestions from the registered component names.
///
/// Candidates are scored by substring containment of the full name, then of
/// the last path segment, then by common prefix length of that segment.
///
/// ```
/// use compono_support::rendering::suggest_similar;
///
/// let available = ["services/config", "services/foo", "models/user"];
/// let suggestions = suggest_similar("services/confg", &available, 3);
/// assert_eq!(suggestions[0], "services/config");
/// ```
pub fn suggest_similar(requested: &str, available: &[&str], max_suggestions: usize) -> Vec<String> {
    let requested_lower = requested.to_lowercase();
    let requested_leaf = leaf(&requested_lower).to_string();

    let mut scored: Vec<(&str, usize)> = available
        .iter()
        .filter_map(|&name| {
            if name == requested {
                return None;
            }
            let name_lower = name.to_lowercase();
            let name_leaf = leaf(&name_lower);

            if name_lower.contains(&requested_lower) || requested_lower.contains(&name_lower) {
                return Some((name, 100));
            }

            if !name_leaf.is_empty()
                && (name_leaf.contains(requested_leaf.as_str()) || requested_leaf.contains(name_leaf))
            {
                return Some((name, 80));
            }

            let common = name_lower
                .chars()
                .zip(requested_lower.chars())
                .take_while(|(a, b)| a == b)
                .count();

            if common >= 3 {
                return Some((name, common * 5));
            }

            None
        })
        .collect();

    // stable: equal scores keep registry order
    scored.sort_by(|a, b| b.1.cmp(&a.1));
    scored
        .into_iter()
        .take(max_suggestions)
        .map(|(name, _)| name.to_string())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn render_simple_chain() {
        let chain = vec!["a", "b", "c", "a"];
        assert_eq!(render_chain(&chain), "a → b → c → a");
    }

    #[test]
    fn render_single_element_chain() {
        assert_eq!(render_chain(&["a"]), "a");
    }

    #[test]
    fn render_empty_chain() {
        let chain: Vec<&str> = vec![];
        assert_eq!(render_chain(&chain), "");
    }

    #[test]
    fn render_empty_list() {
        let items: Vec<String> = vec![];
        assert_eq!(render_list(&items), "");
    }

    #[test]
    fn shorten_simple_path() {
        assert_eq!(shorten_type_name("my_app::services::UserService"), "UserService");
    }

    #[test]
    fn shorten_with_generics() {
        assert_eq!(
            shorten_type_name("alloc::sync::Arc<dyn my_app::traits::Logger>"),
            "Arc<dyn Logger>"
        );
    }

    #[test]
    fn shorten_no_path() {
        assert_eq!(shorten_type_name("String"), "String");
    }

    #[test]
    fn suggest_typo_in_leaf() {
        let available = ["services/foo", "services/config", "models/user"];
        let suggestions = suggest_similar("services/confgi", &available, 3);
        assert!(!suggestions.is_empty());
        assert_eq!(suggestions[0], "services/config");
    }

    #[test]
    fn suggest_missing_prefix() {
        let available = ["models/user", "models/group"];
        let suggestions = suggest_similar("user", &available, 3);
        assert_eq!(suggestions, vec!["models/user".to_string()]);
    }

    #[test]
    fn suggest_skips_exact_name() {
        let available = ["models/user"];
        assert!(suggest_similar("models/user", &available, 3).is_empty());
    }

    #[test]
    fn suggest_no_match() {
        let available = ["services/database"];
        assert!(suggest_similar("xyz", &available, 3).is_empty());
    }
}
