//! Name normalization for heuristic reference matching.

/// Lowercases a name and strips everything except letters and digits.
///
/// `Credit_Decision`, `credit-decision` and `CreditDecision` all normalize
/// to `creditdecision`.
pub fn normalize_name(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_strips_punctuation_and_case() {
        assert_eq!(normalize_name("Credit_Decision"), "creditdecision");
        assert_eq!(normalize_name("credit-decision"), "creditdecision");
        assert_eq!(normalize_name(" Credit Decision (v2) "), "creditdecisionv2");
    }

    #[test]
    fn test_normalize_punctuation_only() {
        assert_eq!(normalize_name("--"), "");
        assert_eq!(normalize_name(""), "");
    }
}
