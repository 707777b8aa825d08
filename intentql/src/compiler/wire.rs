//! Ordered wire parameters and their serialization.
//!
//! | Step                    | Input                           | Output                            |
//! |-------------------------|---------------------------------|-----------------------------------|
//! | `WireParams::push`      | `filters[name][$eq]`, `a&b`     | stored verbatim                   |
//! | `encode_value`          | `a&b`                           | `a%26b`                           |
//! | `to_query_string`       | all pairs                       | `filters[name][$eq]=a%26b&...`    |
//!
//! Only values are percent-encoded. Keys are bracket paths built by
//! [`crate::keys::KeyPath`] and go out as-is, so `[` and `]` are never
//! encoded and nothing is ever encoded twice.

use serde::Serialize;
use std::borrow::Cow;
use url::Url;

use crate::errors::IntentResult;

/// Parameter groups, declared in output order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Category {
    Filters,
    Populate,
    Sort,
    Pagination,
    Fields,
    Locale,
    PublicationState,
    Search,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::Filters,
        Category::Populate,
        Category::Sort,
        Category::Pagination,
        Category::Fields,
        Category::Locale,
        Category::PublicationState,
        Category::Search,
    ];

    /// Root key for the category on the wire.
    pub const fn root(self) -> &'static str {
        match self {
            Category::Filters => "filters",
            Category::Populate => "populate",
            Category::Sort => "sort",
            Category::Pagination => "pagination",
            Category::Fields => "fields",
            Category::Locale => "locale",
            Category::PublicationState => "publicationState",
            Category::Search => "q",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WireParam {
    pub category: Category,
    pub key: String,
    pub value: String,
}

/// Ordered key/value pairs produced by the compiler.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(transparent)]
pub struct WireParams {
    params: Vec<WireParam>,
}

impl WireParams {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, category: Category, key: impl Into<String>, value: impl Into<String>) {
        self.params.push(WireParam {
            category,
            key: key.into(),
            value: value.into(),
        });
    }

    pub fn iter(&self) -> impl Iterator<Item = &WireParam> {
        self.params.iter()
    }

    /// `(key, value)` pairs without encoding, mostly for assertions.
    pub fn pairs(&self) -> Vec<(&str, &str)> {
        self.params.iter().map(|p| (p.key.as_str(), p.value.as_str())).collect()
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter().find(|p| p.key == key).map(|p| p.value.as_str())
    }

    pub fn category(&self, category: Category) -> impl Iterator<Item = &WireParam> {
        self.params.iter().filter(move |p| p.category == category)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.params.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.params.is_empty()
    }

    /// Serialize as `key=value&key=value`, encoding values only.
    pub fn to_query_string(&self) -> String {
        let total_len: usize = self.params.iter().map(|p| p.key.len() + p.value.len() + 2).sum();
        let mut result = String::with_capacity(total_len);
        for (i, param) in self.params.iter().enumerate() {
            if i > 0 {
                result.push('&');
            }
            result.push_str(&param.key);
            result.push('=');
            result.push_str(&encode_value(&param.value));
        }
        result
    }

    /// Attach the query string to `base`.
    ///
    /// The query goes before any `#fragment`, after an existing query if
    /// there is one. With no params the parsed base is returned as is.
    pub fn to_url(&self, base: &str) -> IntentResult<String> {
        let mut url = Url::parse(base)?;
        if self.params.is_empty() {
            return Ok(url.into());
        }
        let query = match url.query().map(|q| q.trim_end_matches('&')) {
            Some(existing) if !existing.is_empty() => format!("{existing}&{}", self.to_query_string()),
            _ => self.to_query_string(),
        };
        // set_query leaves brackets and existing %XX escapes alone.
        url.set_query(Some(&query));
        Ok(url.into())
    }
}

impl<'a> IntoIterator for &'a WireParams {
    type Item = &'a WireParam;
    type IntoIter = std::slice::Iter<'a, WireParam>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

/// Percent-encode a wire value the way `encodeURIComponent` does: ASCII
/// letters, digits and `- _ . ! ~ * ' ( )` are kept, everything else becomes
/// `%XX` over its UTF-8 bytes.
///
/// # Examples
///
/// ```
/// use intentql::compiler::encode_value;
///
/// assert_eq!(encode_value("acme"), "acme");
/// assert_eq!(encode_value("a&b=c"), "a%26b%3Dc");
/// assert_eq!(encode_value("name:desc"), "name%3Adesc");
/// assert_eq!(encode_value("*"), "*");
/// assert_eq!(encode_value("Café Olé"), "Caf%C3%A9%20Ol%C3%A9");
/// ```
pub fn encode_value(value: &str) -> Cow<'_, str> {
    let encoded = urlencoding::encode(value);
    if !COMPONENT_MARKS.iter().any(|(escape, _)| encoded.contains(escape)) {
        return encoded;
    }
    let mut result = String::with_capacity(encoded.len());
    let mut rest = encoded.as_ref();
    // urlencoding always writes three-byte `%XX` escapes.
    while let Some(pos) = rest.find('%') {
        result.push_str(&rest[..pos]);
        let escape = &rest[pos..pos + 3];
        match COMPONENT_MARKS.iter().find(|(e, _)| *e == escape) {
            Some((_, mark)) => result.push(*mark),
            None => result.push_str(escape),
        }
        rest = &rest[pos + 3..];
    }
    result.push_str(rest);
    Cow::Owned(result)
}

/// Marks `encodeURIComponent` leaves alone but `urlencoding` escapes.
const COMPONENT_MARKS: [(&str, char); 5] = [("%21", '!'), ("%27", '\''), ("%28", '('), ("%29", ')'), ("%2A", '*')];
