use serde::{Deserialize, Serialize};

/// Document type codes accepted by the backend's `type` columns.
pub const DEFAULT_TYPE_CODES: &[&str] = &["sale", "purchase", "return", "transfer", "adjustment", "partial_invoice"];

/// Case-insensitive allowlist of enumerated type codes.
///
/// Codes are stored lower-cased; lookups lower-case the candidate first.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<String>", into = "Vec<String>")]
pub struct TypeCodes {
    codes: Vec<String>,
}

impl Default for TypeCodes {
    fn default() -> Self {
        Self::new(DEFAULT_TYPE_CODES.iter().copied())
    }
}

impl TypeCodes {
    pub fn new<S: AsRef<str>>(codes: impl IntoIterator<Item = S>) -> Self {
        let mut normalized: Vec<String> = Vec::new();
        for code in codes {
            let code = code.as_ref().trim().to_lowercase();
            if !code.is_empty() && !normalized.contains(&code) {
                normalized.push(code);
            }
        }
        Self { codes: normalized }
    }

    /// Canonical form of `candidate` if it is on the allowlist.
    pub fn canonicalize(&self, candidate: &str) -> Option<String> {
        let lowered = candidate.to_lowercase();
        self.codes.contains(&lowered).then_some(lowered)
    }

    pub fn contains(&self, candidate: &str) -> bool {
        self.canonicalize(candidate).is_some()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.codes.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.codes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.codes.is_empty()
    }
}

impl From<Vec<String>> for TypeCodes {
    fn from(codes: Vec<String>) -> Self {
        Self::new(codes)
    }
}

impl From<TypeCodes> for Vec<String> {
    fn from(codes: TypeCodes) -> Self {
        codes.codes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn canonicalizes_case_insensitively() {
        let codes = TypeCodes::default();
        assert_eq!(codes.canonicalize("SALE").as_deref(), Some("sale"));
        assert_eq!(codes.canonicalize("Partial_Invoice").as_deref(), Some("partial_invoice"));
        assert_eq!(codes.canonicalize("bogus"), None);
    }

    #[test]
    fn new_dedupes_and_lowercases() {
        let codes = TypeCodes::new(["Sale", "sale ", "", "RETURN"]);
        assert_eq!(codes.iter().collect::<Vec<_>>(), vec!["sale", "return"]);
    }

    #[test]
    fn deserializes_from_plain_list() {
        let codes: TypeCodes = serde_json::from_str(r#"["Transfer", "sale"]"#).unwrap();
        assert_eq!(codes.len(), 2);
        assert!(codes.contains("TRANSFER"));
    }
}
