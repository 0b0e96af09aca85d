//! Builder for HTTP query parameters.
//!
//! Collects key/value pairs so list options and resource filters can be turned
//! into a query string in a stable order.

use std::fmt::Display;

/// Builder for assembling query parameter pairs.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct QueryParams {
    pairs: Vec<(String, String)>,
}

impl QueryParams {
    /// Create a new, empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self { pairs: Vec::new() }
    }

    /// Append a required key/value pair.
    pub fn push<T>(&mut self, key: impl Into<String>, value: T)
    where
        T: Display,
    {
        self.pairs.push((key.into(), value.to_string()));
    }

    /// Append every pair from an iterator.
    pub fn extend<I, K, V>(&mut self, pairs: I)
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Display,
    {
        for (key, value) in pairs {
            self.push(key, value);
        }
    }

    /// Borrow the collected pairs.
    #[must_use]
    pub fn pairs(&self) -> &[(String, String)] {
        &self.pairs
    }

    /// Return the collected key/value pairs.
    #[must_use]
    pub fn into_pairs(self) -> Vec<(String, String)> {
        self.pairs
    }
}

#[cfg(test)]
mod tests {
    use super::QueryParams;

    #[test]
    fn pairs_keep_insertion_order() {
        let mut params = QueryParams::new();
        params.push("page", 2);
        params.push("per_page", 25u32);
        params.extend([("dcIdentifier", "us-east")]);

        assert_eq!(
            params.into_pairs(),
            vec![
                ("page".to_string(), "2".to_string()),
                ("per_page".to_string(), "25".to_string()),
                ("dcIdentifier".to_string(), "us-east".to_string()),
            ]
        );
    }
}
