//! Stack frame types.

use tapline_protocol::wire::WireFrame;

/// One frame of the remote call stack.
///
/// Frames are never cached: every stack request re-fetches the whole stack
/// and renumbers it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StackFrame
{
    /// Position in the stack (0 = top), assigned when the response is translated.
    pub index: usize,
    /// Function or template name.
    pub name: String,
    /// Identifier of the source file, as the remote debuggee names it.
    pub source_uri: String,
    /// Optional numeric handle the remote uses for the source.
    pub source_number: Option<i64>,
    /// Line in `source_uri`.
    pub line: u32,
    /// Column in `source_uri`.
    pub column: u32,
}

impl StackFrame
{
    /// Translate a decoded wire frame, assigning it `index`.
    #[must_use]
    pub fn from_wire(index: usize, frame: WireFrame) -> Self
    {
        Self {
            index,
            name: frame.name,
            source_uri: frame.source_uri,
            source_number: frame.source_number,
            line: frame.line,
            column: frame.column,
        }
    }
}
