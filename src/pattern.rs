use regex::Regex;

/// One parsed match clause from a rule's `pattern` field.
///
/// The stored form is one of `desc_contains=<text>`, `desc_startswith=<text>`
/// or `credit_equals=<number>`, with whitespace tolerated around the `=` and
/// the key matched case-insensitively. Anything else is malformed and simply
/// never matches.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    DescContains(String),
    DescStartsWith(String),
    CreditEquals(f64),
}

fn clause_re(key: &str) -> Regex {
    // Keys are fixed identifiers, so this cannot fail at runtime.
    Regex::new(&format!(r"(?i)^\s*{key}\s*=\s*(.*)$")).unwrap()
}

impl Pattern {
    pub fn parse(raw: &str) -> Option<Pattern> {
        if let Some(caps) = clause_re("desc_contains").captures(raw) {
            return Some(Pattern::DescContains(caps[1].trim().to_lowercase()));
        }
        if let Some(caps) = clause_re("desc_startswith").captures(raw) {
            return Some(Pattern::DescStartsWith(caps[1].trim().to_lowercase()));
        }
        if let Some(caps) = clause_re("credit_equals").captures(raw) {
            return caps[1].trim().parse::<f64>().ok().map(Pattern::CreditEquals);
        }
        None
    }

    pub fn matches(&self, description: &str, credit: f64) -> bool {
        match self {
            // Empty operand is a no-op filter: matches everything.
            Pattern::DescContains(needle) => description.to_lowercase().contains(needle),
            Pattern::DescStartsWith(prefix) => description.to_lowercase().starts_with(prefix.as_str()),
            Pattern::CreditEquals(value) => credit == *value,
        }
    }
}

/// Evaluate a raw rule pattern against one transaction. Malformed patterns
/// are treated as non-matching, never as errors.
pub fn pattern_matches(raw: &str, description: &str, credit: f64) -> bool {
    Pattern::parse(raw).map_or(false, |p| p.matches(description, credit))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_desc_contains_case_insensitive() {
        assert!(pattern_matches("desc_contains=rent", "Monthly Rent Payment", 0.0));
        assert!(pattern_matches("desc_contains=RENT", "monthly rent payment", 0.0));
        assert!(!pattern_matches("desc_contains=mortgage", "Monthly Rent Payment", 0.0));
    }

    #[test]
    fn test_desc_contains_whitespace_around_equals() {
        assert!(pattern_matches("desc_contains = rent", "RENT RECEIVED", 0.0));
        assert!(pattern_matches("DESC_CONTAINS=rent", "rent received", 0.0));
    }

    #[test]
    fn test_desc_contains_empty_operand_matches_everything() {
        assert!(pattern_matches("desc_contains=", "anything at all", -12.0));
        assert!(pattern_matches("desc_startswith=", "anything at all", -12.0));
    }

    #[test]
    fn test_desc_startswith() {
        assert!(pattern_matches("desc_startswith=zelle", "ZELLE FROM TENANT A", 0.0));
        assert!(!pattern_matches("desc_startswith=zelle", "FROM ZELLE", 0.0));
    }

    #[test]
    fn test_credit_equals_numeric_not_string_equality() {
        assert!(pattern_matches("credit_equals=-3.50", "ATM Fee", -3.5));
        assert!(pattern_matches("credit_equals=-3.5", "ATM Fee", -3.5));
        assert!(pattern_matches("credit_equals=1200", "rent", 1200.0));
        assert!(!pattern_matches("credit_equals=-3.50", "ATM Fee", -3.51));
    }

    #[test]
    fn test_malformed_pattern_never_matches() {
        assert!(!pattern_matches("", "rent", 0.0));
        assert!(!pattern_matches("garbage", "rent", 0.0));
        assert!(!pattern_matches("desc_matches=rent", "rent", 0.0));
        assert!(!pattern_matches("credit_equals=abc", "rent", 0.0));
    }

    #[test]
    fn test_parse_forms() {
        assert_eq!(
            Pattern::parse("desc_contains=Zelle"),
            Some(Pattern::DescContains("zelle".to_string()))
        );
        assert_eq!(
            Pattern::parse("credit_equals = -3.50"),
            Some(Pattern::CreditEquals(-3.5))
        );
        assert_eq!(Pattern::parse("credit_equals="), None);
        assert_eq!(Pattern::parse("nonsense"), None);
    }
}
