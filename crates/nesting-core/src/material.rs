use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};

/// Normalized material identity.
///
/// `"Perfil "`, `"perfil"` and `" PERFIL"` are the same material. The first
/// spelling seen (trimmed) is kept for display, while equality, hashing and
/// ordering only look at the canonical form.
#[derive(Debug, Clone)]
pub struct MaterialKey {
    display: String,
    canonical: String,
}

impl MaterialKey {
    pub fn new(raw: &str) -> Self {
        let display = raw.trim().to_string();
        let canonical = canonicalize(raw);
        Self { display, canonical }
    }

    /// Trimmed spelling as first provided by the caller.
    pub fn as_str(&self) -> &str {
        &self.display
    }

    /// Case folded form used for identity.
    pub fn canonical(&self) -> &str {
        &self.canonical
    }

    pub fn is_blank(&self) -> bool {
        self.canonical.is_empty()
    }

    /// Compares against a raw (untrimmed, any case) material string.
    pub fn matches(&self, raw: &str) -> bool {
        self.canonical == canonicalize(raw)
    }
}

/// The one canonicalization used for grouping, stock lookup and purchases.
pub fn canonicalize(raw: &str) -> String {
    raw.trim().to_lowercase()
}

impl PartialEq for MaterialKey {
    fn eq(&self, other: &Self) -> bool {
        self.canonical == other.canonical
    }
}

impl Eq for MaterialKey {}

impl Hash for MaterialKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.canonical.hash(state);
    }
}

impl PartialOrd for MaterialKey {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for MaterialKey {
    fn cmp(&self, other: &Self) -> Ordering {
        self.canonical.cmp(&other.canonical)
    }
}

impl fmt::Display for MaterialKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display)
    }
}

impl From<&str> for MaterialKey {
    fn from(raw: &str) -> Self {
        Self::new(raw)
    }
}

impl Serialize for MaterialKey {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.display)
    }
}

impl<'de> Deserialize<'de> for MaterialKey {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        Ok(Self::new(&raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_trim_and_case_collapse_to_one_key() {
        let a = MaterialKey::new("Perfil ");
        let b = MaterialKey::new("  perfil");
        assert_eq!(a, b);
        assert_eq!(a.as_str(), "Perfil");
        assert_eq!(b.canonical(), "perfil");

        let set: HashSet<MaterialKey> = [a, b].into_iter().collect();
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn test_matches_raw_strings() {
        let key = MaterialKey::new("UE 150x60");
        assert!(key.matches(" ue 150X60 "));
        assert!(!key.matches("UE 200x75"));
        assert!(MaterialKey::new("   ").is_blank());
    }
}
