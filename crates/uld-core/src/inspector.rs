//! # Breakpoint Entry Point
//!
//! What the host runtime calls into.
//!
//! ## Lifecycle
//!
//! 1. Once, before any breakpoint can fire: [`Inspector::new`] with the
//!    runtime facade.
//! 2. Every time a static breakpoint fires: [`Inspector::static_debug`] with
//!    the breakpoint's location. It prints the location banner and runs the
//!    console until the operator continues or exits.

use std::io::{self, BufRead, Write};
use std::process;

use tracing::{error, info};

use crate::error::UldResult;
use crate::runtime::Runtime;
use crate::session::{Session, SessionOutcome};
use crate::types::BreakpointContext;

/// The inspector, bound to one host runtime.
///
/// ## Example
///
/// ```rust
/// use std::io::Cursor;
///
/// use uld_core::runtime::heap::HeapImage;
/// use uld_core::session::SessionOutcome;
/// use uld_core::types::BreakpointContext;
/// use uld_core::Inspector;
///
/// let heap = HeapImage::new();
/// let inspector = Inspector::new(&heap);
/// let ctx = BreakpointContext::new(1, "main.ul", 3, "debug;");
///
/// let mut out = Vec::new();
/// let outcome = inspector
///     .run_breakpoint(&ctx, Cursor::new("c\n"), &mut out, Vec::new())
///     .unwrap();
/// assert_eq!(outcome, SessionOutcome::Resume);
/// ```
#[derive(Clone, Copy)]
pub struct Inspector<'rt>
{
    runtime: &'rt dyn Runtime,
}

impl<'rt> Inspector<'rt>
{
    /// Bind the inspector to the host runtime.
    pub fn new(runtime: &'rt dyn Runtime) -> Self
    {
        Self { runtime }
    }

    /// Print the banner for `ctx`, then run a console session on the given
    /// streams.
    ///
    /// ## Errors
    ///
    /// Only I/O failures on the streams.
    pub fn run_breakpoint<I, O, E>(&self, ctx: &BreakpointContext, input: I, mut out: O, err: E) -> UldResult<SessionOutcome>
    where
        I: BufRead,
        O: Write,
        E: Write,
    {
        info!(
            breakpoint = ctx.breakpoint_no,
            file = %ctx.source_filename,
            line = ctx.source_lineno,
            "static breakpoint hit"
        );
        write!(out, "{ctx}")?;

        let outcome = Session::new(self.runtime, input, out, err).run()?;
        info!(breakpoint = ctx.breakpoint_no, ?outcome, "leaving breakpoint");
        Ok(outcome)
    }

    /// Handle a static breakpoint on the process console.
    ///
    /// Returns when the operator continues. An `exit` ends the process here
    /// with status 0. A console I/O failure is logged and treated as
    /// continue, since no further input can be read.
    pub fn static_debug(&self, ctx: &BreakpointContext)
    {
        let stdin = io::stdin();
        let outcome = self.run_breakpoint(ctx, stdin.lock(), io::stdout(), io::stderr());

        match outcome {
            Ok(SessionOutcome::Resume) => {}
            Ok(SessionOutcome::TerminateProcess) => {
                let _ = io::stdout().flush();
                process::exit(0);
            }
            Err(e) => {
                error!(error = %e, "console failed, resuming program");
            }
        }
    }
}
