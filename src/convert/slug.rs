//! Slug generation for heading anchors.
//!
//! Generates GitHub-style slugs from heading text. Uniqueness within one
//! document is handled by [`AnchorRegistry`], which also records
//! author-provided ids so they are never reused.

use std::collections::HashSet;

/// Generate a slug from text.
///
/// Converts text to lowercase, replaces whitespace and separator characters
/// with hyphens, drops everything else, and removes consecutive and
/// leading/trailing hyphens. Deterministic for identical input.
///
/// # Examples
///
/// ```
/// use cello::convert::slugify;
///
/// assert_eq!(slugify("Chapter One"), "chapter-one");
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// assert_eq!(slugify("  Multiple   Spaces  "), "multiple-spaces");
/// ```
pub fn slugify(text: &str) -> String {
    text.chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() {
                c.to_ascii_lowercase()
            } else if c.is_whitespace() || c == '-' || c == '_' {
                '-'
            } else {
                // Skip other characters
                '\0'
            }
        })
        .filter(|&c| c != '\0')
        .collect::<String>()
        .split('-')
        .filter(|s| !s.is_empty())
        .collect::<Vec<_>>()
        .join("-")
}

/// Set of anchor ids assigned within one document.
///
/// Scoped to a single render; each document starts with an empty registry.
#[derive(Debug, Default)]
pub struct AnchorRegistry {
    seen: HashSet<String>,
}

impl AnchorRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an author-provided id so generated ids never collide with
    /// it. Returns false if the id was already registered.
    pub fn reserve(&mut self, id: &str) -> bool {
        self.seen.insert(id.to_string())
    }

    /// Assign a unique id for heading text. On collision the slug gets a
    /// position-based suffix (`-2`, `-3`, …) in encounter order.
    pub fn assign(&mut self, text: &str) -> String {
        let base = slugify(text);
        if self.seen.insert(base.clone()) {
            return base;
        }
        let mut n = 2;
        loop {
            let candidate = format!("{base}-{n}");
            if self.seen.insert(candidate.clone()) {
                return candidate;
            }
            n += 1;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_slugify_simple() {
        assert_eq!(slugify("Hello World"), "hello-world");
    }

    #[test]
    fn test_slugify_punctuation() {
        assert_eq!(slugify("Hello, World!"), "hello-world");
        assert_eq!(slugify("!!!"), "");
    }

    #[test]
    fn test_slugify_separators() {
        assert_eq!(slugify("hello_world"), "hello-world");
        assert_eq!(slugify("hello--world"), "hello-world");
        assert_eq!(slugify("-hello-"), "hello");
    }

    #[test]
    fn test_slugify_mixed_case_and_numbers() {
        assert_eq!(slugify("Chapter ONE"), "chapter-one");
        assert_eq!(slugify("Chapter 1"), "chapter-1");
    }

    #[test]
    fn test_slugify_empty() {
        assert_eq!(slugify(""), "");
        assert_eq!(slugify("   "), "");
    }

    #[test]
    fn test_assign_is_deterministic() {
        let mut a = AnchorRegistry::new();
        let mut b = AnchorRegistry::new();
        assert_eq!(a.assign("Overview"), b.assign("Overview"));
    }

    #[test]
    fn test_assign_disambiguates_collisions() {
        let mut registry = AnchorRegistry::new();
        assert_eq!(registry.assign("Setup"), "setup");
        assert_eq!(registry.assign("Setup"), "setup-2");
        assert_eq!(registry.assign("Setup"), "setup-3");
    }

    #[test]
    fn test_reserved_ids_are_never_generated() {
        let mut registry = AnchorRegistry::new();
        assert!(registry.reserve("setup"));
        assert_eq!(registry.assign("Setup"), "setup-2");
    }

    #[test]
    fn test_empty_text_still_gets_unique_ids() {
        let mut registry = AnchorRegistry::new();
        assert_eq!(registry.assign("!!!"), "");
        assert_eq!(registry.assign("???"), "-2");
    }
}
