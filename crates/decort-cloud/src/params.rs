//! Form parameters for controller calls

/// Insertion-ordered multimap encoded as `application/x-www-form-urlencoded`.
///
/// Repeated keys are kept and sent in the order they were added.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params {
    pairs: Vec<(String, String)>,
}

impl Params {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builder-style [`Params::push`]
    pub fn with(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.push(key, value);
        self
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl ToString) {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// First value for `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn get_all(&self, key: &str) -> Vec<&str> {
        self.pairs
            .iter()
            .filter(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
            .collect()
    }

    pub fn count(&self, key: &str) -> usize {
        self.pairs.iter().filter(|(k, _)| k == key).count()
    }

    /// Drop every value for `key`, returning how many were removed.
    pub fn remove(&mut self, key: &str) -> usize {
        let before = self.pairs.len();
        self.pairs.retain(|(k, _)| k != key);
        before - self.pairs.len()
    }

    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.pairs.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    /// Form-encode all pairs in insertion order.
    pub fn encode(&self) -> String {
        url::form_urlencoded::Serializer::new(String::new())
            .extend_pairs(self.pairs.iter())
            .finish()
    }
}

impl<K: Into<String>, V: ToString> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut params = Params::new();
        for (k, v) in iter {
            params.push(k, v);
        }
        params
    }
}

impl From<Vec<(String, String)>> for Params {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self { pairs }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_preserves_order_and_multiplicity() {
        let params = Params::new()
            .with("rgId", 12)
            .with("tag", "a")
            .with("name", "vm 1")
            .with("tag", "b");

        assert_eq!(params.encode(), "rgId=12&tag=a&name=vm+1&tag=b");
        assert_eq!(params.get_all("tag"), vec!["a", "b"]);
        assert_eq!(params.count("tag"), 2);
        assert_eq!(params.get("tag"), Some("a"));
        assert_eq!(params.len(), 4);
    }

    #[test]
    fn test_encode_escapes_reserved_characters() {
        let params = Params::new().with("password", "p&ss=w/rd+");
        assert_eq!(params.encode(), "password=p%26ss%3Dw%2Frd%2B");
    }

    #[test]
    fn test_empty() {
        let params = Params::new();
        assert!(params.is_empty());
        assert_eq!(params.encode(), "");
    }

    #[test]
    fn test_remove() {
        let mut params: Params = [("authkey", "x"), ("id", "1"), ("authkey", "y")]
            .into_iter()
            .collect();
        assert_eq!(params.remove("authkey"), 2);
        assert_eq!(params.count("authkey"), 0);
        assert_eq!(params.encode(), "id=1");
        assert_eq!(params.remove("missing"), 0);
    }

    #[test]
    fn test_from_vec() {
        let params = Params::from(vec![("a".to_string(), "1".to_string())]);
        assert_eq!(params.iter().collect::<Vec<_>>(), vec![("a", "1")]);
    }
}
