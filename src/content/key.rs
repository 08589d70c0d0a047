//! Page keys

use std::fmt;
use std::path::{Component, Path};

use crate::error::PageError;

/// A validated page key, safe to use as a single path segment under the pages directory
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PageKey(String);

impl PageKey {
    /// Validate a raw key taken from the request path
    ///
    /// Anything that could resolve outside its own page directory is rejected:
    /// separators, `.`/`..`, NUL bytes, and drive or root prefixes.
    pub fn parse(raw: &str) -> Result<Self, PageError> {
        let invalid = || PageError::InvalidKey(raw.to_string());

        if raw.is_empty() || raw.contains(['/', '\\', '\0']) {
            return Err(invalid());
        }

        let mut components = Path::new(raw).components();
        match (components.next(), components.next()) {
            (Some(Component::Normal(segment)), None) if segment == raw => Ok(Self(raw.to_string())),
            _ => Err(invalid()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<Path> for PageKey {
    fn as_ref(&self) -> &Path {
        Path::new(&self.0)
    }
}

impl fmt::Display for PageKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    #[test]
    fn test_accepts_plain_keys() {
        for raw in ["about", "hello-world", "2024_notes", "café", "v1.2"] {
            let key = PageKey::parse(raw).unwrap();
            assert_eq!(key.as_str(), raw);
        }
    }

    #[test]
    fn test_rejects_traversal() {
        for raw in ["", ".", "..", "../etc", "a/b", "a\\b", "/etc", "nul\0byte"] {
            let err = PageKey::parse(raw).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::InvalidKey, "{raw:?} should be rejected");
        }
    }
}
