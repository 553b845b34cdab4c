//! Insertion-ordered sequence with a uniqueness invariant

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A sequence that never holds the same item twice.
///
/// Items keep the position of their first insertion; inserting an item that
/// is already present is a no-op. Used for lint rule sequences and for text
/// contributions (imports, plugins) where the emitted order matters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OrderedSet<T>(Vec<T>);

impl<T> Default for OrderedSet<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: PartialEq> OrderedSet<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert an item, returning false if it was already present
    pub fn insert(&mut self, item: T) -> bool {
        if self.0.contains(&item) {
            return false;
        }
        self.0.push(item);
        true
    }

    /// Union `other` into this set, keeping first-occurrence order
    pub fn union(&mut self, other: &OrderedSet<T>)
    where
        T: Clone,
    {
        for item in &other.0 {
            self.insert(item.clone());
        }
    }

    pub fn contains(&self, item: &T) -> bool {
        self.0.contains(item)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.0.iter()
    }

    pub fn as_slice(&self) -> &[T] {
        &self.0
    }
}

impl<T: PartialEq> Extend<T> for OrderedSet<T> {
    fn extend<I: IntoIterator<Item = T>>(&mut self, iter: I) {
        for item in iter {
            self.insert(item);
        }
    }
}

impl<T: PartialEq> FromIterator<T> for OrderedSet<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut set = Self::new();
        set.extend(iter);
        set
    }
}

impl<T> IntoIterator for OrderedSet<T> {
    type Item = T;
    type IntoIter = std::vec::IntoIter<T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a, T> IntoIterator for &'a OrderedSet<T> {
    type Item = &'a T;
    type IntoIter = std::slice::Iter<'a, T>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl<T: Serialize> Serialize for OrderedSet<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.0.serialize(serializer)
    }
}

impl<'de, T: Deserialize<'de> + PartialEq> Deserialize<'de> for OrderedSet<T> {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Vec::<T>::deserialize(deserializer).map(|items| items.into_iter().collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_insert_keeps_first_occurrence() {
        let mut set = OrderedSet::new();
        assert!(set.insert("b"));
        assert!(set.insert("a"));
        assert!(!set.insert("b"));
        assert_eq!(set.as_slice(), &["b", "a"]);
    }

    #[test]
    fn test_union_appends_only_new_items() {
        let mut left: OrderedSet<&str> = ["error", "single"].into_iter().collect();
        let right: OrderedSet<&str> = ["error", "double"].into_iter().collect();
        left.union(&right);
        assert_eq!(left.as_slice(), &["error", "single", "double"]);
    }

    #[test]
    fn test_deserialize_collapses_duplicates() {
        let set: OrderedSet<String> = serde_yaml::from_str("[a, b, a, c, b]").unwrap();
        assert_eq!(set.len(), 3);
        assert_eq!(serde_yaml::to_string(&set).unwrap(), "- a\n- b\n- c\n");
    }
}
