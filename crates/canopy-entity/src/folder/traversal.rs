//! Materialized ancestor chains.
//!
//! Every folder row stores `traversal_ids`: the comma-separated ids of its
//! ancestors from the top-level folder down to itself (`"1,4,9"`). This
//! module is the only place that reads or writes that encoding; everything
//! else works with the typed [`TraversalIds`].

use std::collections::HashSet;
use std::fmt;
use std::str::FromStr;

use canopy_core::error::AppError;
use canopy_core::result::AppResult;
use canopy_core::types::FolderId;

const SEPARATOR: char = ',';

/// An ordered root-to-self chain of folder ids. Never empty.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct TraversalIds(Vec<FolderId>);

impl TraversalIds {
    /// The chain of a top-level folder: just itself.
    pub fn root(id: FolderId) -> Self {
        Self(vec![id])
    }

    /// Decode a serialized chain.
    ///
    /// Fails with `MalformedTraversal` if any token is not a positive
    /// integer or an id repeats.
    pub fn decode(serialized: &str) -> AppResult<Self> {
        let mut ids = Vec::new();
        let mut seen = HashSet::new();
        for token in serialized.split(SEPARATOR) {
            let id = token
                .parse::<i64>()
                .ok()
                .filter(|raw| *raw > 0)
                .map(FolderId::new)
                .ok_or_else(|| {
                    AppError::malformed_traversal(format!(
                        "invalid token '{token}' in traversal ids '{serialized}'"
                    ))
                })?;
            if !seen.insert(id) {
                return Err(AppError::malformed_traversal(format!(
                    "id {id} repeats in traversal ids '{serialized}'"
                )));
            }
            ids.push(id);
        }
        Ok(Self(ids))
    }

    /// The chain of `id` placed under `parent` (`None` for a top-level
    /// folder).
    pub fn under(parent: Option<&TraversalIds>, id: FolderId) -> Self {
        match parent {
            Some(chain) => chain.child(id),
            None => Self::root(id),
        }
    }

    /// Serialize the chain.
    pub fn encode(&self) -> String {
        self.0
            .iter()
            .map(|id| id.to_string())
            .collect::<Vec<_>>()
            .join(",")
    }

    /// The chain of a direct child `id` of the folder this chain ends at.
    pub fn child(&self, id: FolderId) -> Self {
        let mut ids = self.0.clone();
        ids.push(id);
        Self(ids)
    }

    /// All ids, root first, self last.
    pub fn ids(&self) -> &[FolderId] {
        &self.0
    }

    /// Ancestor ids without self, root first.
    pub fn ancestors(&self) -> &[FolderId] {
        &self.0[..self.0.len() - 1]
    }

    /// The folder the chain ends at.
    pub fn leaf(&self) -> FolderId {
        self.0[self.0.len() - 1]
    }

    /// Number of ids in the chain (depth + 1).
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the chain holds no ids.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Depth below the namespace root; top-level folders are depth 0.
    pub fn depth(&self) -> usize {
        self.0.len() - 1
    }

    /// Whether `id` is on the chain (self included).
    pub fn contains(&self, id: FolderId) -> bool {
        self.0.contains(&id)
    }

    /// Whether `prefix` is a (non-strict) prefix of this chain.
    pub fn starts_with(&self, prefix: &TraversalIds) -> bool {
        self.0.starts_with(&prefix.0)
    }

    /// Replace `old_prefix` with `new_prefix`, keeping the suffix.
    ///
    /// Returns `None` if the chain does not start with `old_prefix`.
    pub fn rebase(&self, old_prefix: &TraversalIds, new_prefix: &TraversalIds) -> Option<Self> {
        if !self.starts_with(old_prefix) {
            return None;
        }
        let mut ids = new_prefix.0.clone();
        ids.extend_from_slice(&self.0[old_prefix.0.len()..]);
        Some(Self(ids))
    }
}

impl fmt::Display for TraversalIds {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.encode())
    }
}

impl FromStr for TraversalIds {
    type Err = AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::decode(s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use canopy_core::error::ErrorKind;

    fn chain(raw: &str) -> TraversalIds {
        TraversalIds::decode(raw).expect("valid chain")
    }

    #[test]
    fn test_decode_orders_root_first() {
        let ids = chain("1,4,9");
        assert_eq!(ids.ids(), &[FolderId(1), FolderId(4), FolderId(9)]);
        assert_eq!(ids.leaf(), FolderId(9));
        assert_eq!(ids.depth(), 2);
        assert_eq!(ids.ancestors(), &[FolderId(1), FolderId(4)]);
    }

    #[test]
    fn test_decode_rejects_garbage() {
        for raw in ["", "1,,2", "1,x", "0", "1,-3", "2,2", " 1"] {
            let err = TraversalIds::decode(raw).expect_err(raw);
            assert_eq!(err.kind, ErrorKind::MalformedTraversal, "{raw}");
        }
    }

    #[test]
    fn test_under_parent() {
        assert_eq!(TraversalIds::under(None, FolderId(5)).encode(), "5");
        let parent = chain("1,4");
        assert_eq!(TraversalIds::under(Some(&parent), FolderId(5)).encode(), "1,4,5");
    }

    #[test]
    fn test_rebase_keeps_suffix() {
        let descendant = chain("1,4,9,12");
        let moved = descendant
            .rebase(&chain("1,4"), &chain("7,4"))
            .expect("prefix matches");
        assert_eq!(moved.encode(), "7,4,9,12");
        assert!(descendant.rebase(&chain("2"), &chain("3")).is_none());
    }

    #[test]
    fn test_starts_with_is_id_wise() {
        // "1,4" is a textual prefix of "1,45" but not an ancestor of it.
        assert!(!chain("1,45").starts_with(&chain("1,4")));
        assert!(chain("1,4,5").starts_with(&chain("1,4")));
        assert!(chain("1,4").starts_with(&chain("1,4")));
    }
}
