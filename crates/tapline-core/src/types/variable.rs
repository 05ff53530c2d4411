//! Variable and scope types.

use std::fmt;

/// Handle the front end passes back to expand a variable.
///
/// `0` ([`VariableReference::NONE`]) marks a leaf. Other values are either
/// [`VariableReference::STACK_SCOPE`] or a 1-based index into the session's
/// reference table.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct VariableReference(i64);

impl VariableReference
{
    /// Leaf marker: nothing to expand.
    pub const NONE: Self = Self(0);

    /// Reference of the synthetic "Stack" scope.
    ///
    /// Kept inside the signed 32-bit range because many front ends parse
    /// references as `i32`.
    pub const STACK_SCOPE: Self = Self(0x7fff_ff00);

    /// Create a reference from a raw value.
    #[must_use]
    pub const fn from_raw(value: i64) -> Self
    {
        Self(value)
    }

    /// Raw numeric value.
    #[must_use]
    pub const fn raw(self) -> i64
    {
        self.0
    }

    /// Whether this reference can be expanded.
    #[must_use]
    pub const fn is_expandable(self) -> bool
    {
        self.0 != 0
    }
}

impl fmt::Display for VariableReference
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "{}", self.0)
    }
}

impl From<i64> for VariableReference
{
    fn from(value: i64) -> Self
    {
        Self(value)
    }
}

/// A named value of the remote program.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variable
{
    /// Name relative to the parent node.
    pub name: String,
    /// Type name as reported by the remote debuggee.
    pub type_name: String,
    /// Display text, already rendered by the remote debuggee.
    pub value: String,
    /// Child nodes, if the remote sent any.
    pub children: Option<Vec<Variable>>,
    /// Expansion handle; [`VariableReference::NONE`] for leaves.
    pub reference: VariableReference,
}

impl Variable
{
    /// Whether this node currently has at least one child.
    #[must_use]
    pub fn has_children(&self) -> bool
    {
        self.children.as_ref().is_some_and(|children| !children.is_empty())
    }
}

/// A group of variables shown as one expandable root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scope
{
    /// Display name.
    pub name: String,
    /// Reference to request the scope's variables with.
    pub reference: VariableReference,
    /// Whether listing this scope is costly for the remote.
    pub expensive: bool,
}

impl Scope
{
    /// The scope holding the values of the current stack top.
    #[must_use]
    pub fn stack() -> Self
    {
        Self {
            name: "Stack".to_string(),
            reference: VariableReference::STACK_SCOPE,
            expensive: false,
        }
    }
}
