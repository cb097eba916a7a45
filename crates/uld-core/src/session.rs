//! # Console Session
//!
//! The read-dispatch-print loop that runs while a breakpoint is active.
//!
//! A session is either running (prompting for commands) or finished with a
//! [`SessionOutcome`]. Only `continue` and `exit` finish it. Operator
//! mistakes and decoding failures are printed to the error stream and the
//! session keeps running.
//!
//! The session never terminates the process itself: `exit` is returned as
//! [`SessionOutcome::TerminateProcess`] and the caller decides.

use std::io::{BufRead, Write};

use tracing::{debug, warn};

use crate::command::{self, Command, CommandError, ObjectArg, PrintTarget, HELP};
use crate::error::{UldError, UldResult};
use crate::render::ObjectRenderer;
use crate::reports::Reports;
use crate::runtime::Runtime;

/// Printed before every line of input.
pub const PROMPT: &str = "uld > ";

/// Frames belonging to the inspector itself, dropped from `print bt`.
const INSPECTOR_FRAMES: usize = 1;

/// How a session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionOutcome
{
    /// Return control to the program.
    Resume,
    /// End the whole process with a success status.
    TerminateProcess,
}

/// One breakpoint's console.
pub struct Session<'rt, I, O, E>
{
    runtime: &'rt dyn Runtime,
    input: I,
    out: O,
    err: E,
}

impl<'rt, I, O, E> Session<'rt, I, O, E>
where
    I: BufRead,
    O: Write,
    E: Write,
{
    /// Create a session reading commands from `input`.
    ///
    /// Query results go to `out`; operator errors go to `err`.
    pub fn new(runtime: &'rt dyn Runtime, input: I, out: O, err: E) -> Self
    {
        Self {
            runtime,
            input,
            out,
            err,
        }
    }

    /// Prompt and execute commands until the session finishes.
    ///
    /// End of input resumes the program, since no further command can
    /// arrive.
    ///
    /// ## Errors
    ///
    /// Only I/O failures on the console streams.
    pub fn run(&mut self) -> UldResult<SessionOutcome>
    {
        let mut line = String::new();
        loop {
            write!(self.out, "{PROMPT}")?;
            self.out.flush()?;

            line.clear();
            if self.input.read_line(&mut line)? == 0 {
                warn!("console input closed, resuming");
                writeln!(self.out)?;
                return Ok(SessionOutcome::Resume);
            }

            if let Some(outcome) = self.execute(&line)? {
                return Ok(outcome);
            }
        }
    }

    /// Execute one line.
    ///
    /// Returns `None` while the session keeps running.
    ///
    /// ## Errors
    ///
    /// Only I/O failures on the console streams.
    pub fn execute(&mut self, line: &str) -> UldResult<Option<SessionOutcome>>
    {
        let command = match command::parse(line) {
            Ok(command) => command,
            Err(e) => {
                self.report(&e)?;
                return Ok(None);
            }
        };
        debug!(?command, "dispatching");

        match command {
            Command::Empty | Command::Ignored => {}
            Command::Continue => return Ok(Some(SessionOutcome::Resume)),
            Command::Exit => return Ok(Some(SessionOutcome::TerminateProcess)),
            Command::Help => write!(self.out, "{HELP}")?,
            Command::Print(target) => self.print(target)?,
        }
        self.out.flush()?;
        Ok(None)
    }

    fn print(&mut self, target: PrintTarget) -> UldResult<()>
    {
        let reports = Reports::new(self.runtime);
        match target {
            PrintTarget::Allocated => {
                reports.allocations(&mut self.out)?;
            }
            PrintTarget::Assemblies => {
                reports.assemblies(&mut self.out)?;
            }
            PrintTarget::Types => {
                reports.types(&mut self.out)?;
            }
            PrintTarget::Object(arg) => {
                if self.check_object(&arg)? {
                    let rendered = ObjectRenderer::new(self.runtime).render(arg.address);
                    self.emit(rendered, &arg)?;
                }
            }
            PrintTarget::Fields(arg) => {
                if self.check_object(&arg)? {
                    let listed = ObjectRenderer::new(self.runtime)
                        .list_fields(arg.address)
                        .map(|text| text.trim_end_matches('\n').to_string());
                    self.emit(listed, &arg)?;
                }
            }
            PrintTarget::Backtrace => {
                writeln!(self.out, "{}", self.runtime.stack_trace(INSPECTOR_FRAMES))?;
            }
        }
        Ok(())
    }

    /// The single validity gate in front of the renderer.
    fn check_object(&mut self, arg: &ObjectArg) -> UldResult<bool>
    {
        if self.runtime.allocations().contains(arg.address) {
            return Ok(true);
        }
        self.report(&CommandError::NotAnObject(arg.token.clone()))?;
        Ok(false)
    }

    fn emit(&mut self, rendered: UldResult<String>, arg: &ObjectArg) -> UldResult<()>
    {
        match rendered {
            Ok(text) => writeln!(self.out, "{text}")?,
            Err(UldError::Io(e)) => return Err(UldError::Io(e)),
            Err(e) => {
                warn!(address = %arg.address, error = %e, "object decoding failed");
                writeln!(self.err, "Could not decode object at {}: {e}", arg.address)?;
            }
        }
        Ok(())
    }

    fn report(&mut self, error: &CommandError) -> UldResult<()>
    {
        debug!(%error, "rejected command");
        writeln!(self.err, "{error}")?;
        self.err.flush()?;
        Ok(())
    }

    /// Give back the console streams.
    pub fn into_parts(self) -> (I, O, E)
    {
        (self.input, self.out, self.err)
    }
}
