use std::collections::HashMap;
use std::path::Path;

use voxrelay_foundation::error::ConfigError;

/// A static source-term to target-term mapping, applied as a pre-translation
/// rewrite and as a translator hint. Read-only after load.
#[derive(Debug, Clone, Default)]
pub struct Glossary {
    entries: HashMap<String, String>,
}

impl Glossary {
    pub fn empty() -> Self {
        Self::default()
    }

    /// Parse the dictionary file format: UTF-8, one entry per line,
    /// `source_term<TAB>target_term`; blank lines and `#` comments ignored.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConfigError::Validation {
                field: "dictionary".to_string(),
                reason: format!("failed to read {}: {e}", path.as_ref().display()),
            }
        })?;
        Ok(Self::parse(&contents))
    }

    pub fn parse(contents: &str) -> Self {
        let mut entries = HashMap::new();
        for line in contents.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            if let Some((source, target)) = line.split_once('\t') {
                let source = source.trim();
                let target = target.trim();
                if !source.is_empty() && !target.is_empty() {
                    entries.insert(source.to_string(), target.to_string());
                }
            }
        }
        Self { entries }
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Rewrite every occurrence of a glossary key in `text` with its target
    /// term, longest keys first so overlapping terms don't get partially
    /// replaced by a shorter entry.
    pub fn apply(&self, text: &str) -> String {
        if self.entries.is_empty() {
            return text.to_string();
        }
        let mut keys: Vec<&String> = self.entries.keys().collect();
        keys.sort_by_key(|k| std::cmp::Reverse(k.len()));

        let mut result = text.to_string();
        for key in keys {
            let value = &self.entries[key];
            result = replace_word_boundary(&result, key, value);
        }
        result
    }

    /// A rendered hint (e.g. for a translation model's instructions) listing
    /// the glossary's target-side terms so they're preserved verbatim.
    pub fn target_hint(&self) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let mut pairs: Vec<String> = self
            .entries
            .iter()
            .map(|(k, v)| format!("{k} -> {v}"))
            .collect();
        pairs.sort();
        Some(format!(
            "Preserve these terms exactly as given, do not translate them: {}",
            pairs.join("; ")
        ))
    }

    /// Whether `value` maps back to some glossary key (the round-trip check).
    pub fn maps_back(&self, value: &str) -> bool {
        self.entries.values().any(|v| v == value)
    }
}

fn replace_word_boundary(haystack: &str, needle: &str, replacement: &str) -> String {
    if needle.is_empty() {
        return haystack.to_string();
    }
    let mut out = String::with_capacity(haystack.len());
    let mut rest = haystack;
    while let Some(idx) = rest.find(needle) {
        let before_ok = rest[..idx]
            .chars()
            .next_back()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);
        let after_idx = idx + needle.len();
        let after_ok = rest[after_idx..]
            .chars()
            .next()
            .map(|c| !c.is_alphanumeric())
            .unwrap_or(true);

        if before_ok && after_ok {
            out.push_str(&rest[..idx]);
            out.push_str(replacement);
        } else {
            out.push_str(&rest[..after_idx]);
        }
        rest = &rest[after_idx..];
    }
    out.push_str(rest);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tab_separated_entries_ignoring_comments_and_blanks() {
        let glossary = Glossary::parse(
            "# this is a comment\n\nKubernetes\tKubernetes\nLLM\t\u{5927}\u{8bed}\u{8a00}\u{6a21}\u{578b}\n",
        );
        assert_eq!(glossary.len(), 2);
    }

    #[test]
    fn apply_replaces_whole_word_occurrences_only() {
        let glossary = Glossary::parse("Rust\tRust\n");
        assert_eq!(glossary.apply("I love Rust programming"), "I love Rust programming");
        assert_eq!(glossary.apply("Trustworthy code"), "Trustworthy code");
    }

    #[test]
    fn round_trip_law_key_replaced_value_maps_back() {
        let glossary = Glossary::parse("OpenAI\tOpenAI Inc.\n");
        let source = "OpenAI released a new model";
        let rewritten = glossary.apply(source);
        assert!(!rewritten.contains("OpenAI released"));
        assert!(glossary.maps_back("OpenAI Inc."));
    }

    #[test]
    fn longest_key_wins_for_overlapping_entries() {
        let glossary = Glossary::parse("New York\tNY\nYork\tYRK\n");
        assert_eq!(glossary.apply("I live in New York"), "I live in NY");
    }
}
