/// Bracket-path key construction (`filters[customer][name][$eq]`).
///
/// Segments are appended verbatim; the key half of a wire pair is never
/// percent-encoded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KeyPath {
    path: String,
}

impl KeyPath {
    pub fn root(name: &str) -> Self {
        Self { path: name.to_string() }
    }

    /// New path with `[segment]` appended.
    pub fn child(&self, segment: &str) -> Self {
        let mut path = String::with_capacity(self.path.len() + segment.len() + 2);
        path.push_str(&self.path);
        path.push('[');
        path.push_str(segment);
        path.push(']');
        Self { path }
    }

    /// New path with `[index]` appended.
    pub fn index(&self, index: usize) -> Self {
        self.child(&index.to_string())
    }

    #[inline]
    pub fn as_str(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn into_string(self) -> String {
        self.path
    }
}

impl std::fmt::Display for KeyPath {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builds_nested_filter_keys() {
        let key = KeyPath::root("filters").child("customer").child("name").child("$containsi");
        assert_eq!(key.as_str(), "filters[customer][name][$containsi]");
    }

    #[test]
    fn builds_indexed_keys() {
        let key = KeyPath::root("populate").index(1);
        assert_eq!(key.to_string(), "populate[1]");
    }
}
