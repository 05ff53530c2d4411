//! # Variable Tree Cache
//!
//! Keeps the value tree of the current stack top so the front end can drill
//! into nested values without refetching the whole tree from the root.
//!
//! ## References
//!
//! Every node that has children gets a [`VariableReference`] derived from its
//! dotted path through the [`ReferenceTable`]. Refreshing the tree reuses the
//! same references, so expansion state kept by the front end stays valid.
//!
//! ## Resolved nodes
//!
//! Nodes fetched by path (see [`VariableCache::resolve`]) are kept next to
//! the root tree until the session ends, so the references they hand out
//! can be expanded even when the path is not part of the stack tree.
//!
//! ## Stale handles
//!
//! A reference whose path no longer exists in the tree, or whose node lost
//! its children, resolves to nothing. Callers turn that into an empty child
//! list; it is never an error.
//!
//! ## Malformed entries
//!
//! Entries without a string `name`, `type` and `value` are dropped while the
//! tree is built. Their siblings are kept.

pub mod references;

use std::collections::BTreeMap;

use serde_json::Value;
use tapline_protocol::wire::{decode_entry, WireVariable};

pub use self::references::ReferenceTable;
use crate::types::{window, Variable, VariableReference};

/// Dotted path of `name` below `parent`.
#[must_use]
pub fn join_path(parent: Option<&str>, name: &str) -> String
{
    match parent {
        Some(parent) => format!("{parent}.{name}"),
        None => name.to_string(),
    }
}

fn is_below(target: &str, path: &str) -> bool
{
    target.len() > path.len() && target.starts_with(path) && target.as_bytes()[path.len()] == b'.'
}

/// The cached value tree plus the session's reference table.
#[derive(Debug, Clone, Default)]
pub struct VariableCache
{
    references: ReferenceTable,
    root: Vec<Variable>,
    /// Nodes resolved by path, keyed by that path.
    resolved: BTreeMap<String, Variable>,
}

impl VariableCache
{
    /// Create an empty cache.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// The reference table backing this cache.
    #[must_use]
    pub fn references(&self) -> &ReferenceTable
    {
        &self.references
    }

    /// Top-level entries of the cached tree.
    #[must_use]
    pub fn root(&self) -> &[Variable]
    {
        &self.root
    }

    /// Replace the cached tree with a `values/stack` payload.
    ///
    /// A payload that is not an array leaves an empty tree.
    pub fn replace_root(&mut self, payload: &Value)
    {
        let entries = payload.as_array().map(Vec::as_slice).unwrap_or_default();
        self.root = self.build(None, entries);
    }

    /// Page of top-level entries (`count == 0` = all remaining).
    #[must_use]
    pub fn root_page(&self, start: usize, count: usize) -> Vec<Variable>
    {
        window(&self.root, start, count)
    }

    /// Path behind `reference`, if a known node at that path has children.
    ///
    /// Both the root tree and the nodes resolved by path are searched.
    #[must_use]
    pub fn expandable_path(&self, reference: VariableReference) -> Option<String>
    {
        let path = self.references.path(reference)?;
        let in_root = find(&self.root, None, path).is_some_and(Variable::has_children);
        let in_resolved = || {
            self.resolved
                .iter()
                .any(|(base, node)| find_within(node, base, path).is_some_and(Variable::has_children))
        };
        (in_root || in_resolved()).then(|| path.to_string())
    }

    /// Rebuild the children of the node at `path` from a `values?path=` payload.
    ///
    /// The payload is either the node itself (an object with `children`) or
    /// the array of its children. Every cached copy of the node, in the root
    /// tree or among resolved nodes, takes the new children. Returns the new
    /// children.
    pub fn replace_children(&mut self, path: &str, payload: &Value) -> Vec<Variable>
    {
        let entries = child_entries(payload);
        let children = self.build(Some(path), entries);
        if let Some(node) = find_mut(&mut self.root, None, path) {
            node.children = Some(children.clone());
        }
        for (base, resolved) in &mut self.resolved {
            if let Some(node) = find_within_mut(resolved, base, path) {
                node.children = Some(children.clone());
            }
        }
        children
    }

    /// Build the node at `path` from a `values?path=` payload.
    ///
    /// The node is remembered under `path` so its references stay
    /// expandable. Returns `None` if the payload is not a well-formed node.
    pub fn resolve(&mut self, path: &str, payload: &Value) -> Option<Variable>
    {
        let wire: WireVariable = decode_entry(payload)?;
        let node = self.build_node(path.to_string(), wire);
        self.resolved.insert(path.to_string(), node.clone());
        Some(node)
    }

    /// Drop the tree, the resolved nodes and every reference.
    pub fn clear(&mut self)
    {
        self.root.clear();
        self.resolved.clear();
        self.references.clear();
    }

    fn build(&mut self, parent: Option<&str>, entries: &[Value]) -> Vec<Variable>
    {
        let mut nodes = Vec::with_capacity(entries.len());
        for entry in entries {
            let Some(wire) = decode_entry::<WireVariable>(entry) else {
                continue;
            };
            let path = join_path(parent, &wire.name);
            nodes.push(self.build_node(path, wire));
        }
        nodes
    }

    fn build_node(&mut self, path: String, wire: WireVariable) -> Variable
    {
        let children = wire.child_entries().map(|entries| self.build(Some(&path), entries));
        let reference = if children.as_ref().is_some_and(|children| !children.is_empty()) {
            self.references.reference_for(&path)
        } else {
            VariableReference::NONE
        };

        Variable {
            name: wire.name,
            type_name: wire.type_name,
            value: wire.value,
            children,
            reference,
        }
    }
}

fn child_entries(payload: &Value) -> &[Value]
{
    match payload {
        Value::Array(entries) => entries.as_slice(),
        Value::Object(node) => node
            .get("children")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default(),
        _ => &[],
    }
}

fn find<'a>(nodes: &'a [Variable], parent: Option<&str>, target: &str) -> Option<&'a Variable>
{
    for node in nodes {
        let path = join_path(parent, &node.name);
        if path == target {
            return Some(node);
        }
        // A sibling may itself carry a dotted name, so keep scanning when
        // the descent finds nothing.
        if is_below(target, &path) {
            if let Some(found) = node
                .children
                .as_deref()
                .and_then(|children| find(children, Some(&path), target))
            {
                return Some(found);
            }
        }
    }
    None
}

fn find_mut<'a>(nodes: &'a mut [Variable], parent: Option<&str>, target: &str) -> Option<&'a mut Variable>
{
    for node in nodes.iter_mut() {
        let path = join_path(parent, &node.name);
        if path == target {
            return Some(node);
        }
        if is_below(target, &path) {
            if let Some(found) = node
                .children
                .as_deref_mut()
                .and_then(|children| find_mut(children, Some(&path), target))
            {
                return Some(found);
            }
        }
    }
    None
}

/// Node at `target` inside `node`, which lives at `base`.
fn find_within<'a>(node: &'a Variable, base: &str, target: &str) -> Option<&'a Variable>
{
    if base == target {
        return Some(node);
    }
    if !is_below(target, base) {
        return None;
    }
    node.children
        .as_deref()
        .and_then(|children| find(children, Some(base), target))
}

fn find_within_mut<'a>(node: &'a mut Variable, base: &str, target: &str) -> Option<&'a mut Variable>
{
    if base == target {
        return Some(node);
    }
    if !is_below(target, base) {
        return None;
    }
    node.children
        .as_deref_mut()
        .and_then(|children| find_mut(children, Some(base), target))
}
