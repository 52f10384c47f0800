//! Path normalization shared by route keys, navigation targets and links.

/// Normalize a path for matching.
///
/// Query string and fragment are dropped, empty segments removed (so
/// trailing and duplicate slashes disappear) and the empty path becomes `/`.
pub fn normalize(path: &str) -> String {
    let end = path.find(|c| c == '?' || c == '#').unwrap_or(path.len());
    let segments: Vec<&str> = path[..end].split('/').filter(|s| !s.is_empty()).collect();
    if segments.is_empty() {
        "/".to_string()
    } else {
        format!("/{}", segments.join("/"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn root_forms() {
        assert_eq!(normalize(""), "/");
        assert_eq!(normalize("/"), "/");
        assert_eq!(normalize("//"), "/");
        assert_eq!(normalize("?tab=1"), "/");
    }

    #[test]
    fn strips_slashes_query_and_fragment() {
        assert_eq!(normalize("/users/"), "/users");
        assert_eq!(normalize("/tracks//today/"), "/tracks/today");
        assert_eq!(normalize("/recap?mode=weekly"), "/recap");
        assert_eq!(normalize("/activities#new"), "/activities");
        assert_eq!(normalize("users"), "/users");
    }
}
