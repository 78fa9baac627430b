//! Selection keys for configuration rows

use std::fmt;

/// Segment value meaning "every segment"
pub const ALL_SEGMENTS: &str = "ALL";

/// Segment substituted for `ALL` when a single row is read
pub const FALLBACK_SEGMENT: &str = "MCH";

/// Segment part of a selection key
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Segment {
    /// Match every segment of the tactic/vertical pair
    All,
    /// Match one named segment
    Named(String),
}

impl Segment {
    /// Parse a segment, recognising the `ALL` sentinel
    pub fn parse(s: &str) -> Self {
        if s == ALL_SEGMENTS {
            Self::All
        } else {
            Self::Named(s.to_string())
        }
    }

    /// True for the `ALL` sentinel
    pub fn is_all(&self) -> bool {
        matches!(self, Self::All)
    }

    /// Segment used when resolving a single row for display
    pub fn for_single_row(&self) -> &str {
        match self {
            Self::All => FALLBACK_SEGMENT,
            Self::Named(s) => s,
        }
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::All => f.write_str(ALL_SEGMENTS),
            Self::Named(s) => f.write_str(s),
        }
    }
}

/// Tactic × vertical × segment key
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectionKey {
    pub tactic: String,
    pub vertical: String,
    pub segment: Segment,
}

impl SelectionKey {
    /// Create a new selection key
    pub fn new(tactic: impl Into<String>, vertical: impl Into<String>, segment: Segment) -> Self {
        Self {
            tactic: tactic.into(),
            vertical: vertical.into(),
            segment,
        }
    }
}

impl fmt::Display for SelectionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.tactic, self.vertical, self.segment)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_sentinel() {
        assert_eq!(Segment::parse("ALL"), Segment::All);
        assert_eq!(Segment::parse("all"), Segment::Named("all".into()));
        assert_eq!(Segment::parse("S1"), Segment::Named("S1".into()));
    }

    #[test]
    fn test_single_row_fallback() {
        assert_eq!(Segment::All.for_single_row(), "MCH");
        assert_eq!(Segment::Named("S2".into()).for_single_row(), "S2");
    }

    #[test]
    fn test_display() {
        let key = SelectionKey::new("A", "V1", Segment::All);
        assert_eq!(key.to_string(), "A/V1/ALL");
    }
}
