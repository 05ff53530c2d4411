//! # Types
//!
//! Values handed to the front end.
//!
//! Everything here is rebuilt from remote responses on each request; the only
//! state that outlives a request is the variable reference table held by the
//! session (see [`crate::variables`]).

pub mod breakpoint;
pub mod stack;
pub mod variable;

// Re-export all public types
pub use breakpoint::{Breakpoint, BreakpointSet};
pub use stack::StackFrame;
pub use variable::{Scope, Variable, VariableReference};

/// Return the `count` items starting at `start`.
///
/// A `count` of zero means "everything from `start` on". A `start` past the end
/// yields an empty page.
pub(crate) fn window<T: Clone>(items: &[T], start: usize, count: usize) -> Vec<T>
{
    let Some(rest) = items.get(start..) else {
        return Vec::new();
    };
    let take = if count == 0 { rest.len() } else { count.min(rest.len()) };
    rest[..take].to_vec()
}
