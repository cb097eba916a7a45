//! Breakpoint location types.

use std::fmt;

/// Where execution stopped when a static breakpoint fired.
///
/// The host runtime fills this in from the debug information compiled into
/// the program and passes it to
/// [`Inspector::static_debug`](crate::inspector::Inspector::static_debug).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BreakpointContext
{
    /// Breakpoint number as declared in the program.
    pub breakpoint_no: u32,
    /// Source file containing the breakpoint.
    pub source_filename: String,
    /// One-based line number.
    pub source_lineno: u32,
    /// Literal text of the source line.
    pub source_line: String,
}

impl BreakpointContext
{
    /// Describe a breakpoint location.
    pub fn new(
        breakpoint_no: u32,
        source_filename: impl Into<String>,
        source_lineno: u32,
        source_line: impl Into<String>,
    ) -> Self
    {
        Self {
            breakpoint_no,
            source_filename: source_filename.into(),
            source_lineno,
            source_line: source_line.into(),
        }
    }
}

impl fmt::Display for BreakpointContext
{
    /// The banner printed when the breakpoint fires.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        writeln!(f)?;
        writeln!(
            f,
            "ULD: Static Breakpoint {} @ file '{}' line {}:",
            self.breakpoint_no, self.source_filename, self.source_lineno
        )?;
        writeln!(f, "{} {}", self.source_lineno, self.source_line)
    }
}
