//! Component naming conventions for discovered definition sources.

/// Derives a component name from a source path by stripping the final
/// extension of the last path segment.
///
/// ```
/// use compono_support::naming::component_name;
///
/// assert_eq!(component_name("services/foo.js"), "services/foo");
/// assert_eq!(component_name("models/user"), "models/user");
/// assert_eq!(component_name("archive.tar.gz"), "archive.tar");
/// ```
pub fn component_name(path: &str) -> &str {
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[segment_start..].rfind('.') {
        // a leading dot is part of the name (".env")
        Some(0) | None => path,
        Some(dot) => &path[..segment_start + dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_last_extension_only() {
        assert_eq!(component_name("a.b.c"), "a.b");
    }

    #[test]
    fn dots_in_directories_are_kept() {
        assert_eq!(component_name("v1.2/handler"), "v1.2/handler");
        assert_eq!(component_name("v1.2/handler.rs"), "v1.2/handler");
    }

    #[test]
    fn hidden_file_keeps_name() {
        assert_eq!(component_name("config/.env"), "config/.env");
    }

    #[test]
    fn bare_name() {
        assert_eq!(component_name("app.js"), "app");
        assert_eq!(component_name("app"), "app");
    }
}
