use std::fmt;

use crate::models::{EntityId, ListParams};

/// Identity of one cache slot: ordered segments, most general first.
///
/// `["purchases", "list", "skip=10", "take=5", "status=approved"]`
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct QueryKey(Vec<String>);

impl QueryKey {
    pub fn new<I, S>(segments: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self(segments.into_iter().map(Into::into).collect())
    }

    /// Every slot of an entity.
    pub fn root(entity: &str) -> Self {
        Self(vec![entity.to_string()])
    }

    /// Prefix of every list slot of an entity.
    pub fn lists(entity: &str) -> Self {
        Self(vec![entity.to_string(), "list".to_string()])
    }

    pub fn list(entity: &str, params: &ListParams) -> Self {
        let mut key = Self::lists(entity);
        key.0.extend(pairs(&params.to_query()));
        key
    }

    pub fn detail(entity: &str, id: EntityId) -> Self {
        Self(vec![entity.to_string(), "detail".to_string(), id.to_string()])
    }

    /// Prefix of every search slot of an entity.
    pub fn searches(entity: &str) -> Self {
        Self(vec![entity.to_string(), "search".to_string()])
    }

    /// Search slots: `[entity, "search", kind, k=v...]`.
    pub fn search(entity: &str, kind: &str, terms: &[(String, String)]) -> Self {
        let mut key = Self(vec![entity.to_string(), "search".to_string(), kind.to_string()]);
        key.0.extend(pairs(terms));
        key
    }

    pub fn segments(&self) -> &[String] {
        &self.0
    }

    pub fn entity(&self) -> Option<&str> {
        self.0.first().map(String::as_str)
    }

    /// Segment-wise prefix match; `["sales", "list"]` does not match
    /// `["sales", "lists"]`.
    pub fn starts_with(&self, prefix: &QueryKey) -> bool {
        self.0.starts_with(&prefix.0)
    }
}

fn pairs(terms: &[(String, String)]) -> impl Iterator<Item = String> + '_ {
    terms.iter().map(|(k, v)| format!("{}={}", k, v))
}

impl fmt::Display for QueryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join(":"))
    }
}
