//! Categorical examples and the attribute lists trees split on.

use std::fmt;

use crate::error::Id3Error;

/// Reserved attribute holding the target label of an [`Example`].
pub const CLASS_KEY: &str = "Class";

/// Sentinel value for an attribute whose value is unknown.
pub const MISSING_VALUE: &str = "?";

/// One labeled observation: attribute name to categorical value.
///
/// Attributes keep the order in which they were first inserted, so the
/// attribute list derived from an example is stable across runs. Setting an
/// attribute that already exists replaces its value in place.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Example {
    values: Vec<(String, String)>,
}

impl Example {
    /// Create an example with no attributes.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Set `attribute` to `value` and return the example.
    #[must_use]
    pub fn with(mut self, attribute: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(attribute, value);
        self
    }

    /// Set `attribute` to `value`, replacing any previous value.
    pub fn insert(&mut self, attribute: impl Into<String>, value: impl Into<String>) {
        let attribute = attribute.into();
        let value = value.into();
        match self.values.iter_mut().find(|(name, _)| *name == attribute) {
            Some(slot) => slot.1 = value,
            None => self.values.push((attribute, value)),
        }
    }

    /// Return the value of `attribute`, if present.
    #[must_use]
    pub fn get(&self, attribute: &str) -> Option<&str> {
        self.values
            .iter()
            .find(|(name, _)| name == attribute)
            .map(|(_, value)| value.as_str())
    }

    /// Return the value of `attribute`, or [`MISSING_VALUE`] when it is absent.
    #[must_use]
    pub fn value_or_missing(&self, attribute: &str) -> &str {
        self.get(attribute).unwrap_or(MISSING_VALUE)
    }

    /// Return the target label stored under [`CLASS_KEY`].
    #[must_use]
    pub fn class(&self) -> Option<&str> {
        self.get(CLASS_KEY)
    }

    /// Iterate attribute names in insertion order, including [`CLASS_KEY`].
    pub fn attribute_names(&self) -> impl Iterator<Item = &str> {
        self.values.iter().map(|(name, _)| name.as_str())
    }

    /// Iterate `(attribute, value)` pairs in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.values
            .iter()
            .map(|(name, value)| (name.as_str(), value.as_str()))
    }

    /// Return the number of attributes, including [`CLASS_KEY`].
    #[must_use]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Return `true` if the example has no attributes at all.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Example
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut example = Example::new();
        for (attribute, value) in iter {
            example.insert(attribute, value);
        }
        example
    }
}

/// Ordered, duplicate-free attribute names eligible for splitting.
///
/// Never contains [`CLASS_KEY`]. Iteration order decides ties between
/// attributes with equal information gain.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AttributeList(Vec<String>);

impl AttributeList {
    /// Build an attribute list from names in priority order.
    ///
    /// # Errors
    ///
    /// | Variant                              | When                         |
    /// |--------------------------------------|------------------------------|
    /// | [`Id3Error::ReservedAttribute`]      | a name equals [`CLASS_KEY`]  |
    /// | [`Id3Error::DuplicateAttribute`]     | a name appears twice         |
    pub fn new<I, S>(names: I) -> Result<Self, Id3Error>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut list: Vec<String> = Vec::new();
        for name in names {
            let name = name.into();
            if name == CLASS_KEY {
                return Err(Id3Error::ReservedAttribute { name });
            }
            if list.contains(&name) {
                return Err(Id3Error::DuplicateAttribute { name });
            }
            list.push(name);
        }
        Ok(Self(list))
    }

    /// Derive the list from an example's keys, dropping [`CLASS_KEY`].
    #[must_use]
    pub fn from_example(example: &Example) -> Self {
        Self(
            example
                .attribute_names()
                .filter(|&name| name != CLASS_KEY)
                .map(String::from)
                .collect(),
        )
    }

    /// Return a copy of the list without `attribute`.
    #[must_use]
    pub fn without(&self, attribute: &str) -> Self {
        Self(
            self.0
                .iter()
                .filter(|name| name.as_str() != attribute)
                .cloned()
                .collect(),
        )
    }

    /// Return `true` if the list contains `attribute`.
    #[must_use]
    pub fn contains(&self, attribute: &str) -> bool {
        self.0.iter().any(|name| name == attribute)
    }

    /// Iterate attribute names in priority order.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(String::as_str)
    }

    /// Return the number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Return `true` if no attribute is left to split on.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Return the names as a slice.
    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.0
    }
}

impl fmt::Display for AttributeList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}]", self.0.join(", "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_replaces_existing_value() {
        let mut ex = Example::new().with("color", "red").with("Class", "yes");
        ex.insert("color", "blue");
        assert_eq!(ex.get("color"), Some("blue"));
        assert_eq!(ex.len(), 2);
        let pairs: Vec<(&str, &str)> = ex.iter().collect();
        assert_eq!(pairs, [("color", "blue"), ("Class", "yes")]);
    }

    #[test]
    fn new_example_is_empty() {
        let ex = Example::new();
        assert!(ex.is_empty());
        assert_eq!(ex.iter().count(), 0);
        assert!(!ex.with("a", "x").is_empty());
    }

    #[test]
    fn attribute_order_is_insertion_order() {
        let ex: Example = [("b", "1"), ("Class", "no"), ("a", "2")].into_iter().collect();
        let names: Vec<&str> = ex.attribute_names().collect();
        assert_eq!(names, ["b", "Class", "a"]);
    }

    #[test]
    fn value_or_missing_falls_back_to_sentinel() {
        let ex = Example::new().with("a", "x");
        assert_eq!(ex.value_or_missing("a"), "x");
        assert_eq!(ex.value_or_missing("b"), MISSING_VALUE);
        assert_eq!(ex.class(), None);
    }

    #[test]
    fn attribute_list_from_example_skips_class() {
        let ex = Example::new()
            .with("Class", "yes")
            .with("size", "big")
            .with("shape", "round");
        let list = AttributeList::from_example(&ex);
        assert_eq!(list.as_slice(), &["size".to_string(), "shape".to_string()]);
    }

    #[test]
    fn attribute_list_rejects_class() {
        let err = AttributeList::new(["a", "Class"]).unwrap_err();
        assert!(matches!(err, Id3Error::ReservedAttribute { .. }));
    }

    #[test]
    fn attribute_list_rejects_duplicates() {
        let err = AttributeList::new(["a", "b", "a"]).unwrap_err();
        assert!(matches!(err, Id3Error::DuplicateAttribute { name } if name == "a"));
    }

    #[test]
    fn without_removes_exactly_one_name() {
        let list = AttributeList::new(["a", "b", "c"]).unwrap();
        let reduced = list.without("b");
        assert_eq!(reduced.len(), 2);
        assert!(!reduced.contains("b"));
        assert_eq!(list.len(), 3);
        assert_eq!(format!("{reduced}"), "[a, c]");
    }
}
