//! # Console Commands
//!
//! Parsing of one line of operator input into a [`Command`].
//!
//! A line is split on single spaces. The first token is looked up in
//! [`VERBS`]; for `print` the second token is looked up in
//! [`PRINT_TARGETS`]. Anything not in those tables parses to
//! [`Command::Ignored`]: the console does nothing and prints nothing for it.

use thiserror::Error;

use crate::types::{Address, AddressParseError};

/// A parsed console command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command
{
    /// Blank line.
    Empty,
    /// Leave the console and resume the program.
    Continue,
    /// Terminate the whole process.
    Exit,
    /// Show the command table.
    Help,
    /// Run one of the print queries.
    Print(PrintTarget),
    /// Unrecognized command or print target; deliberately a no-op.
    Ignored,
}

/// What `print` should show.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PrintTarget
{
    /// Allocation report.
    Allocated,
    /// Assembly report.
    Assemblies,
    /// Type report.
    Types,
    /// Render one object.
    Object(ObjectArg),
    /// List the fields of one object.
    Fields(ObjectArg),
    /// Stack trace of the stopped thread.
    Backtrace,
}

/// An object address as typed by the operator.
///
/// The token as typed is kept for error messages.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ObjectArg
{
    /// Parsed address.
    pub address: Address,
    /// Token exactly as typed.
    pub token: String,
}

/// First-token meanings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb
{
    /// `continue`
    Continue,
    /// `exit`
    Exit,
    /// `print`
    Print,
    /// `help`
    Help,
}

/// Second-token meanings for `print`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Target
{
    /// `print allocated`
    Allocated,
    /// `print asm`
    Assemblies,
    /// `print type`
    Types,
    /// `print object <addr>`
    Object,
    /// `print fields <addr>`
    Fields,
    /// `print bt`
    Backtrace,
}

/// Command names and aliases. Case-sensitive.
pub const VERBS: &[(&str, Verb)] = &[
    ("continue", Verb::Continue),
    ("cont", Verb::Continue),
    ("c", Verb::Continue),
    ("exit", Verb::Exit),
    ("quit", Verb::Exit),
    ("q", Verb::Exit),
    ("print", Verb::Print),
    ("p", Verb::Print),
    ("help", Verb::Help),
    ("h", Verb::Help),
    ("?", Verb::Help),
];

/// `print` subcommand names and aliases. Case-sensitive.
pub const PRINT_TARGETS: &[(&str, Target)] = &[
    ("allocated", Target::Allocated),
    ("alloc", Target::Allocated),
    ("alloced", Target::Allocated),
    ("asm", Target::Assemblies),
    ("asms", Target::Assemblies),
    ("assembly", Target::Assemblies),
    ("assemblies", Target::Assemblies),
    ("type", Target::Types),
    ("types", Target::Types),
    ("object", Target::Object),
    ("obj", Target::Object),
    ("fields", Target::Fields),
    ("flds", Target::Fields),
    ("field", Target::Fields),
    ("fld", Target::Fields),
    ("bt", Target::Backtrace),
    ("backtrace", Target::Backtrace),
    ("stacktrace", Target::Backtrace),
    ("stack", Target::Backtrace),
];

/// Help text printed by `help`.
pub const HELP: &str = "\
Commands:
  continue | cont | c                        resume the program
  exit | quit | q                            terminate the process
  print allocated | alloc | alloced          list live objects
  print asm | asms | assembly | assemblies   list assemblies
  print type | types                         list types
  print object | obj <hex-addr>              show one object
  print fields | flds | field | fld <hex-addr>
                                             show an object's fields
  print bt | backtrace | stacktrace | stack  show the stack
";

/// Operator mistakes reported on the console.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError
{
    /// `print` without a target.
    #[error("No data specified to print!")]
    MissingPrintTarget,

    /// `print object`/`print fields` without an address.
    #[error("Must supply the object pointer!")]
    MissingAddress,

    /// The address token is not hexadecimal.
    #[error("Invalid object pointer!")]
    InvalidAddress
    {
        /// Token as typed
        token: String,
        /// Why it was rejected
        #[source]
        reason: AddressParseError,
    },

    /// The address is not a live object.
    #[error("{0} does not point to a valid ULR object!")]
    NotAnObject(String),
}

fn lookup<T: Copy>(table: &[(&str, T)], token: &str) -> Option<T>
{
    table
        .iter()
        .find_map(|(name, value)| (*name == token).then_some(*value))
}

/// Split a line on single spaces.
///
/// Consecutive spaces yield empty tokens. A trailing empty token is dropped,
/// so `"p "` is `["p"]` and `""` is no tokens at all.
pub fn tokenize(line: &str) -> Vec<&str>
{
    let line = line.trim_end_matches(['\r', '\n']);
    let mut tokens: Vec<&str> = line.split(' ').collect();
    if tokens.last() == Some(&"") {
        tokens.pop();
    }
    tokens
}

/// Parse one line of input.
///
/// ## Errors
///
/// - `MissingPrintTarget`: `print` alone
/// - `MissingAddress`: `print object` / `print fields` without an address
/// - `InvalidAddress`: the address is not hexadecimal
///
/// ## Example
///
/// ```rust
/// use uld_core::command::{parse, Command, PrintTarget};
///
/// assert_eq!(parse("c"), Ok(Command::Continue));
/// assert_eq!(parse("p types"), Ok(Command::Print(PrintTarget::Types)));
/// assert_eq!(parse("frobnicate"), Ok(Command::Ignored));
/// ```
pub fn parse(line: &str) -> Result<Command, CommandError>
{
    let tokens = tokenize(line);
    let Some(first) = tokens.first() else {
        return Ok(Command::Empty);
    };

    let verb = match lookup(VERBS, first) {
        Some(verb) => verb,
        None => return Ok(Command::Ignored),
    };

    match verb {
        Verb::Continue => Ok(Command::Continue),
        Verb::Exit => Ok(Command::Exit),
        Verb::Help => Ok(Command::Help),
        Verb::Print => parse_print(&tokens[1..]),
    }
}

fn parse_print(args: &[&str]) -> Result<Command, CommandError>
{
    let Some(target) = args.first() else {
        return Err(CommandError::MissingPrintTarget);
    };

    let target = match lookup(PRINT_TARGETS, target) {
        Some(target) => target,
        None => return Ok(Command::Ignored),
    };

    let target = match target {
        Target::Allocated => PrintTarget::Allocated,
        Target::Assemblies => PrintTarget::Assemblies,
        Target::Types => PrintTarget::Types,
        Target::Backtrace => PrintTarget::Backtrace,
        Target::Object => PrintTarget::Object(parse_object_arg(args.get(1))?),
        Target::Fields => PrintTarget::Fields(parse_object_arg(args.get(1))?),
    };
    Ok(Command::Print(target))
}

fn parse_object_arg(token: Option<&&str>) -> Result<ObjectArg, CommandError>
{
    let token = *token.ok_or(CommandError::MissingAddress)?;
    let address = Address::parse_hex(token).map_err(|reason| CommandError::InvalidAddress {
        token: token.to_string(),
        reason,
    })?;
    Ok(ObjectArg {
        address,
        token: token.to_string(),
    })
}
