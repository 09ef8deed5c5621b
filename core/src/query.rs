//! Query string parameters with a reproducible encoding.
//!
//! Keys are kept in a `BTreeMap`, so the encoded string is the same for the
//! same inputs regardless of insertion order. Parameters whose value is empty
//! are kept but never encoded.

use std::collections::btree_map;
use std::collections::BTreeMap;

/// Separator for list values such as `category_codes=HUMR,ENV`.
pub const LIST_SEPARATOR: char = ',';

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryParameters {
    params: BTreeMap<String, String>,
}

impl QueryParameters {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.params.insert(key.into(), value.into())
    }

    /// Set `key` to the comma-joined `values`.
    pub fn insert_list<I, S>(&mut self, key: impl Into<String>, values: I) -> Option<String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let joined = values
            .into_iter()
            .map(|v| v.as_ref().to_string())
            .collect::<Vec<_>>()
            .join(&LIST_SEPARATOR.to_string());
        self.insert(key, joined)
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.get(key).map(String::as_str)
    }

    /// True when encoding would produce an empty string.
    pub fn is_empty(&self) -> bool {
        self.params.values().all(String::is_empty)
    }

    /// Non-empty parameters in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params
            .iter()
            .filter(|(_, v)| !v.is_empty())
            .map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// `k1=v1&k2=v2` with percent-encoded keys and values, no leading `?`.
    ///
    /// The list separator is left literal; each list element is encoded on
    /// its own.
    pub fn encode(&self) -> String {
        self.iter()
            .map(|(k, v)| format!("{}={}", urlencoding::encode(k), encode_value(v)))
            .collect::<Vec<_>>()
            .join("&")
    }
}

fn encode_value(value: &str) -> String {
    value
        .split(LIST_SEPARATOR)
        .map(|part| urlencoding::encode(part).into_owned())
        .collect::<Vec<_>>()
        .join(&LIST_SEPARATOR.to_string())
}

impl<'a> IntoIterator for &'a QueryParameters {
    type Item = (&'a String, &'a String);
    type IntoIter = btree_map::Iter<'a, String, String>;

    fn into_iter(self) -> Self::IntoIter {
        self.params.iter()
    }
}

impl<K, V> FromIterator<(K, V)> for QueryParameters
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut query = QueryParameters::new();
        for (k, v) in iter {
            query.insert(k, v);
        }
        query
    }
}
