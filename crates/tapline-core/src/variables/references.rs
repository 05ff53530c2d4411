//! Path-keyed reference table.
//!
//! References are handed out per dotted path (`local.items.0`), never per
//! value, so a node keeps its reference across refreshes even when its value
//! changes. The table only grows; it is dropped with the session.

use crate::types::VariableReference;

/// Append-only list of paths; a path's reference is its 1-based position.
#[derive(Debug, Clone, Default)]
pub struct ReferenceTable
{
    paths: Vec<String>,
}

impl ReferenceTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Reference for `path`, allocating one if the path is new.
    ///
    /// Lookup is a linear scan; value trees are small and shallow.
    pub fn reference_for(&mut self, path: &str) -> VariableReference
    {
        let index = match self.paths.iter().position(|known| known == path) {
            Some(index) => index,
            None => {
                self.paths.push(path.to_string());
                self.paths.len() - 1
            }
        };
        VariableReference::from_raw(i64::try_from(index + 1).unwrap_or(i64::MAX))
    }

    /// Path a reference was allocated for.
    #[must_use]
    pub fn path(&self, reference: VariableReference) -> Option<&str>
    {
        let index = usize::try_from(reference.raw().checked_sub(1)?).ok()?;
        self.paths.get(index).map(String::as_str)
    }

    /// Number of allocated references.
    #[must_use]
    pub fn len(&self) -> usize
    {
        self.paths.len()
    }

    /// Whether no reference was allocated yet.
    #[must_use]
    pub fn is_empty(&self) -> bool
    {
        self.paths.is_empty()
    }

    /// Forget every reference. Only called when the session ends.
    pub fn clear(&mut self)
    {
        self.paths.clear();
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    #[test]
    fn test_references_start_at_one()
    {
        let mut table = ReferenceTable::new();
        assert_eq!(table.reference_for("local").raw(), 1);
        assert_eq!(table.reference_for("local.items").raw(), 2);
    }

    #[test]
    fn test_same_path_same_reference()
    {
        let mut table = ReferenceTable::new();
        let first = table.reference_for("local.items");
        table.reference_for("arguments");
        let second = table.reference_for("local.items");
        assert_eq!(first, second);
        assert_eq!(table.len(), 2);
    }

    #[test]
    fn test_resolve()
    {
        let mut table = ReferenceTable::new();
        let reference = table.reference_for("local.items");
        assert_eq!(table.path(reference), Some("local.items"));
    }

    #[test]
    fn test_unknown_references_resolve_to_nothing()
    {
        let mut table = ReferenceTable::new();
        table.reference_for("local");
        assert_eq!(table.path(VariableReference::NONE), None);
        assert_eq!(table.path(VariableReference::from_raw(-4)), None);
        assert_eq!(table.path(VariableReference::from_raw(2)), None);
        assert_eq!(table.path(VariableReference::STACK_SCOPE), None);
        assert_eq!(table.path(VariableReference::from_raw(i64::MIN)), None);
    }

    #[test]
    fn test_clear()
    {
        let mut table = ReferenceTable::new();
        let reference = table.reference_for("local");
        table.clear();
        assert!(table.is_empty());
        assert_eq!(table.path(reference), None);
    }
}
