//! Member path descriptor for binding endpoints.

use std::fmt;

/// The member path an endpoint is bound to, e.g. `User.Address.City` or
/// `Items[0].Name`.
///
/// A path with a debug tag is *debuggable*: bindings whose target path is
/// debuggable report their update steps to the
/// [`DebugSink`](crate::DebugSink) under that tag.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct BindingPath {
    path: String,
    parts: Vec<String>,
    debug_tag: Option<String>,
}

impl BindingPath {
    /// Parse a dotted member path.
    ///
    /// # Path Syntax
    ///
    /// - Members are separated by `.`
    /// - Indexers (`[0]`, `["key"]`) become their own part
    /// - Surrounding whitespace and empty members are ignored
    ///
    /// ```rust
    /// use tether_binding::BindingPath;
    ///
    /// let path = BindingPath::new("Items[0].Name");
    /// assert_eq!(path.parts(), ["Items", "[0]", "Name"]);
    /// assert!(!path.is_single());
    /// ```
    pub fn new(path: &str) -> Self {
        let path = path.trim();
        let mut parts = Vec::new();
        for member in path.split('.') {
            Self::split_indexers(member.trim(), &mut parts);
        }
        Self {
            path: path.to_string(),
            parts,
            debug_tag: None,
        }
    }

    /// The empty path: the endpoint itself.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Mark the path debuggable under `tag`.
    pub fn with_debug_tag(mut self, tag: impl Into<String>) -> Self {
        self.debug_tag = Some(tag.into());
        self
    }

    fn split_indexers(member: &str, parts: &mut Vec<String>) {
        let mut rest = member;
        while let Some(open) = rest.find('[') {
            if open > 0 {
                parts.push(rest[..open].to_string());
            }
            match rest[open..].find(']') {
                Some(close) => {
                    parts.push(rest[open..open + close + 1].to_string());
                    rest = &rest[open + close + 1..];
                }
                None => {
                    // Unterminated indexer, keep it verbatim.
                    parts.push(rest[open..].to_string());
                    rest = "";
                }
            }
        }
        if !rest.is_empty() {
            parts.push(rest.to_string());
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn parts(&self) -> &[String] {
        &self.parts
    }

    pub fn is_empty(&self) -> bool {
        self.parts.is_empty()
    }

    pub fn is_single(&self) -> bool {
        self.parts.len() == 1
    }

    pub fn is_debuggable(&self) -> bool {
        self.debug_tag.is_some()
    }

    pub fn debug_tag(&self) -> Option<&str> {
        self.debug_tag.as_deref()
    }
}

impl fmt::Display for BindingPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_dotted_members() {
        let path = BindingPath::new("User.Address.City");
        assert_eq!(path.parts(), ["User", "Address", "City"]);
        assert_eq!(path.path(), "User.Address.City");
        assert!(!path.is_empty());
        assert!(!path.is_single());
    }

    #[test]
    fn single_member() {
        let path = BindingPath::new("Text");
        assert!(path.is_single());
        assert_eq!(format!("{}", path), "Text");
    }

    #[test]
    fn empty_and_whitespace_paths_are_empty() {
        assert!(BindingPath::new("").is_empty());
        assert!(BindingPath::new("  ").is_empty());
        assert!(BindingPath::empty().is_empty());
        assert_eq!(BindingPath::new(" . ").parts().len(), 0);
    }

    #[test]
    fn indexers_are_separate_parts() {
        let path = BindingPath::new("Items[0][\"key\"].Name");
        assert_eq!(path.parts(), ["Items", "[0]", "[\"key\"]", "Name"]);
    }

    #[test]
    fn unterminated_indexer_kept_verbatim() {
        let path = BindingPath::new("Items[0");
        assert_eq!(path.parts(), ["Items", "[0"]);
    }

    #[test]
    fn debug_tag_makes_path_debuggable() {
        let path = BindingPath::new("Text");
        assert!(!path.is_debuggable());
        assert_eq!(path.debug_tag(), None);

        let tagged = path.with_debug_tag("login-form");
        assert!(tagged.is_debuggable());
        assert_eq!(tagged.debug_tag(), Some("login-form"));
    }
}
