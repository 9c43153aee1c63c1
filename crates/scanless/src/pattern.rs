//! Regex terminal handles.
//!
//! A [`TokenPattern`] wraps a compiled regex so that it can only match at the
//! offset the parser is currently standing on. Compilation prepends an `\A`
//! anchor inside a non-capturing group, which keeps user capture-group
//! numbering intact while pinning the match to the start of the remaining
//! input.

use compact_str::CompactString;
use regex::Regex;

/// A compiled regex terminal, executable at an arbitrary byte offset.
#[derive(Debug, Clone)]
pub struct TokenPattern {
    source: CompactString,
    regex: Regex,
    nullable: bool,
    /// Declared name per capture group, index 0 = group 1.
    group_names: Vec<Option<CompactString>>,
}

/// Overall match span plus the spans of every participating capture group.
///
/// All offsets are byte offsets into the original input, not into the
/// remaining suffix the regex actually ran on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternMatch {
    pub start: usize,
    pub end: usize,
    pub captures: Vec<CaptureSpan>,
}

/// One matched capture group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CaptureSpan {
    /// Declared group name, or the 1-based group index rendered as a string.
    pub name: CompactString,
    pub start: usize,
    pub end: usize,
}

/// Errors raised while compiling a pattern terminal.
#[derive(Debug, Clone, thiserror::Error)]
pub enum PatternError {
    #[error("invalid pattern '{pattern}': {source}")]
    InvalidPattern {
        pattern: CompactString,
        source: regex::Error,
    },

    /// Group ordering is not recoverable from the regex engine once named and
    /// unnamed groups are interleaved, so the combination is rejected.
    #[error("pattern '{pattern}' mixes named and unnamed capture groups")]
    MixedCaptureGroups { pattern: CompactString },
}

impl TokenPattern {
    /// Compile a user pattern into an offset-anchored regex.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError::InvalidPattern`] when the regex does not
    /// compile and [`PatternError::MixedCaptureGroups`] when the pattern
    /// declares both named and unnamed capture groups.
    pub fn compile(source: &str) -> Result<Self, PatternError> {
        let regex =
            Regex::new(&format!(r"\A(?:{source})")).map_err(|e| PatternError::InvalidPattern {
                pattern: source.into(),
                source: e,
            })?;

        let group_names: Vec<Option<CompactString>> = regex
            .capture_names()
            .skip(1)
            .map(|n| n.map(CompactString::from))
            .collect();

        let named = group_names.iter().flatten().count();
        if named > 0 && named != group_names.len() {
            return Err(PatternError::MixedCaptureGroups {
                pattern: source.into(),
            });
        }

        // The regex crate has no nullability introspection; probing the
        // anchored pattern against the empty string is equivalent.
        let nullable = regex.is_match("");

        Ok(Self {
            source: source.into(),
            regex,
            nullable,
            group_names,
        })
    }

    /// The pattern text as the user wrote it, without the anchor.
    #[must_use]
    pub fn source(&self) -> &str {
        &self.source
    }

    /// Whether the pattern can succeed consuming zero characters.
    #[must_use]
    pub const fn is_nullable(&self) -> bool {
        self.nullable
    }

    /// Number of capture groups the pattern declares.
    #[must_use]
    pub fn group_count(&self) -> usize {
        self.group_names.len()
    }

    /// Execute the pattern against `input` at `offset`.
    ///
    /// Returns `None` when the pattern does not match exactly at `offset`.
    /// Unmatched capture groups are skipped; matched groups carry their
    /// declared name or their 1-based index as a string.
    #[must_use]
    pub fn match_at(&self, input: &str, offset: usize) -> Option<PatternMatch> {
        let caps = self.regex.captures(&input[offset..])?;
        let overall = caps
            .get(0)
            .expect("group 0 is always present on a successful match");

        let captures = (1..caps.len())
            .filter_map(|i| {
                caps.get(i).map(|m| CaptureSpan {
                    name: match &self.group_names[i - 1] {
                        Some(name) => name.clone(),
                        None => compact_str::format_compact!("{i}"),
                    },
                    start: offset + m.start(),
                    end: offset + m.end(),
                })
            })
            .collect();

        Some(PatternMatch {
            start: offset + overall.start(),
            end: offset + overall.end(),
            captures,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_anchored_match() {
        let p = TokenPattern::compile("[0-9]+").unwrap();
        let m = p.match_at("ab12cd", 2).unwrap();
        assert_eq!((m.start, m.end), (2, 4));

        // Does not skip ahead to a later match.
        assert!(p.match_at("ab12cd", 0).is_none());
    }

    #[test]
    fn test_nullable_detection() {
        assert!(TokenPattern::compile("[0-9]*").unwrap().is_nullable());
        assert!(!TokenPattern::compile("[0-9]+").unwrap().is_nullable());
    }

    #[test]
    fn test_named_captures() {
        let p = TokenPattern::compile(r#"(?<key>[a-z]+)=(?<value>[0-9]+)"#).unwrap();
        let m = p.match_at("abc=42;", 0).unwrap();
        assert_eq!(m.end, 6);
        assert_eq!(m.captures.len(), 2);
        assert_eq!(m.captures[0].name, "key");
        assert_eq!(m.captures[1].name, "value");
        assert_eq!((m.captures[1].start, m.captures[1].end), (4, 6));
    }

    #[test]
    fn test_numbered_captures() {
        let p = TokenPattern::compile("([a-z]+)([0-9]+)?").unwrap();
        let m = p.match_at("abc", 0).unwrap();
        // Second group did not participate and is skipped.
        assert_eq!(m.captures.len(), 1);
        assert_eq!(m.captures[0].name, "1");
    }

    #[test]
    fn test_mixed_groups_rejected() {
        let err = TokenPattern::compile("(?<name>[a-z]+)([0-9]+)").unwrap_err();
        assert!(matches!(err, PatternError::MixedCaptureGroups { .. }));
    }

    #[test]
    fn test_invalid_pattern() {
        let err = TokenPattern::compile("[unclosed").unwrap_err();
        assert!(matches!(err, PatternError::InvalidPattern { .. }));
    }

    #[test]
    fn test_group_numbering_survives_anchor() {
        // The anchor wrapper is non-capturing, so group 1 stays group 1.
        let p = TokenPattern::compile("(a)(b)").unwrap();
        let m = p.match_at("ab", 0).unwrap();
        assert_eq!(m.captures[0].name, "1");
        assert_eq!(m.captures[1].name, "2");
    }
}
