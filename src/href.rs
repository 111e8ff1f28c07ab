//! Reference resolution.
//!
//! Every document in a DTS is identified by one canonical string: an absolute
//! URL for remote documents, a filesystem path for local ones. `resolve_href`
//! produces that canonical form for any href found in a schema, linkbase, or
//! instance, and the result doubles as the memo key across the loader.

use std::path::{Component, Path, PathBuf};

use url::Url;

/// Whether a locator points at a remote document rather than a local file.
pub fn is_remote(location: &str) -> bool {
    location.starts_with("http://") || location.starts_with("https://")
}

/// Resolve `href` against the document it appeared in.
///
/// Absolute URLs pass through unchanged. A remote base resolves the reference
/// per RFC 3986; a local base joins on the containing directory.
pub fn resolve_href(base: &str, href: &str) -> String {
    if is_remote(href) {
        return href.to_string();
    }

    if is_remote(base) {
        if let Ok(base_url) = Url::parse(base) {
            if let Ok(resolved) = base_url.join(href) {
                return resolved.to_string();
            }
        }
        // Unparseable base: fall through to the path join below.
    }

    let dir = Path::new(base).parent().unwrap_or_else(|| Path::new(""));
    clean_path(&dir.join(href))
}

/// Lexically resolve `.` and `..` components, so the same document always
/// canonicalizes to the same memo key regardless of how it was referenced.
fn clean_path(path: &Path) -> String {
    let mut cleaned = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => match cleaned.components().next_back() {
                Some(Component::Normal(_)) => {
                    cleaned.pop();
                }
                Some(Component::RootDir) => {}
                _ => cleaned.push(".."),
            },
            other => cleaned.push(other),
        }
    }
    cleaned.to_string_lossy().into_owned()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_remote() {
        assert!(is_remote("http://example.com/a.xsd"));
        assert!(is_remote("https://example.com/a.xsd"));
        assert!(!is_remote("/data/a.xsd"));
        assert!(!is_remote("a.xsd"));
    }

    #[test]
    fn test_absolute_href_passes_through() {
        assert_eq!(
            resolve_href("/data/report.xbrl", "http://example.com/t.xsd"),
            "http://example.com/t.xsd"
        );
    }

    #[test]
    fn test_remote_base_relative_reference() {
        assert_eq!(
            resolve_href("http://example.com/taxonomy/2021/jpcrp.xsd", "jpcrp_lab.xml"),
            "http://example.com/taxonomy/2021/jpcrp_lab.xml"
        );
        assert_eq!(
            resolve_href("http://example.com/taxonomy/2021/jpcrp.xsd", "../shared/core.xsd"),
            "http://example.com/taxonomy/shared/core.xsd"
        );
        // Root-relative references replace the whole path.
        assert_eq!(
            resolve_href("http://example.com/taxonomy/2021/jpcrp.xsd", "/core.xsd"),
            "http://example.com/core.xsd"
        );
    }

    #[test]
    fn test_local_base_joins_on_parent() {
        assert_eq!(
            resolve_href("/data/filing/report.xbrl", "jpcrp.xsd"),
            "/data/filing/jpcrp.xsd"
        );
        // Parent references resolve lexically, keeping memo keys canonical.
        assert_eq!(
            resolve_href("/data/filing/report.xbrl", "../taxonomy/jpcrp.xsd"),
            "/data/taxonomy/jpcrp.xsd"
        );
        assert_eq!(
            resolve_href("/data/report.xbrl", "./jpcrp.xsd"),
            "/data/jpcrp.xsd"
        );
    }

    #[test]
    fn test_bare_filename_base() {
        assert_eq!(resolve_href("report.xbrl", "jpcrp.xsd"), "jpcrp.xsd");
    }
}
