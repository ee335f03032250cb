use serde::Serialize;
use serde_json::Value;
use std::collections::{btree_map, BTreeMap};

/// A set of named attributes attached to a record
///
/// Keys are unique and always iterate in byte-wise order, so uppercase keys
/// sort before lowercase ones.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct Fields(BTreeMap<String, Value>);

impl Fields {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts an attribute, returning the value it replaced
    pub fn insert<K, V>(&mut self, key: K, value: V) -> Option<Value>
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.0.insert(key.into(), value.into())
    }

    /// Builder form of [`Fields::insert`]
    pub fn with<K, V>(mut self, key: K, value: V) -> Self
    where
        K: Into<String>,
        V: Into<Value>,
    {
        self.insert(key, value);
        self
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.0.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> btree_map::Iter<'_, String, Value> {
        self.0.iter()
    }

    /// Returns a copy of these fields overlaid with `other`, whose keys win
    pub fn merged(&self, other: &Fields) -> Fields {
        let mut merged = self.clone();
        merged.extend(other.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

impl Extend<(String, Value)> for Fields {
    fn extend<I: IntoIterator<Item = (String, Value)>>(&mut self, iter: I) {
        self.0.extend(iter)
    }
}

impl<K, V> FromIterator<(K, V)> for Fields
where
    K: Into<String>,
    V: Into<Value>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Fields(
            iter.into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl IntoIterator for Fields {
    type Item = (String, Value);
    type IntoIter = btree_map::IntoIter<String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a Fields {
    type Item = (&'a String, &'a Value);
    type IntoIter = btree_map::Iter<'a, String, Value>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl From<BTreeMap<String, Value>> for Fields {
    fn from(map: BTreeMap<String, Value>) -> Self {
        Fields(map)
    }
}

/// Builds [`Fields`] from `key => value` pairs
///
/// ```
/// use json_context_logger::fields;
///
/// let fields = fields! { "sso" => "444444444", "size" => 10 };
/// assert_eq!(fields.len(), 2);
/// ```
#[macro_export]
macro_rules! fields {
    () => {
        $crate::Fields::new()
    };
    ($($key:expr => $value:expr),+ $(,)?) => {{
        let mut fields = $crate::Fields::new();
        $(
            fields.insert($key, $value);
        )+
        fields
    }};
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn iterates_in_byte_order() {
        let fields = fields! { "zeta" => 1, "alpha" => 2, "Zulu" => 3, "sample message" => "x" };
        let keys: Vec<_> = fields.iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Zulu", "alpha", "sample message", "zeta"]);
    }

    #[test]
    fn merged_prefers_other_on_collision() {
        let bound = fields! { "sso" => "123123123", "uid" => "abc" };
        let extra = fields! { "sso" => "999999999", "size" => 25 };
        let merged = bound.merged(&extra);
        assert_eq!(merged.get("sso"), Some(&json!("999999999")));
        assert_eq!(merged.get("uid"), Some(&json!("abc")));
        assert_eq!(merged.get("size"), Some(&json!(25)));
        // the receiver is left untouched
        assert_eq!(bound.get("sso"), Some(&json!("123123123")));
        assert_eq!(bound.len(), 2);
    }

    #[test]
    fn holds_nested_values() {
        let fields = Fields::new().with(
            "headers",
            json!({ "user-agent": ["some-browser", "another-browser"] }),
        );
        assert_eq!(
            serde_json::to_string(&fields).unwrap(),
            r#"{"headers":{"user-agent":["some-browser","another-browser"]}}"#
        );
    }
}
