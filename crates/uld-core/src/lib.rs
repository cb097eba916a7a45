//! # uld-core
//!
//! In-process inspector for programs running on the ULR runtime.
//!
//! When the inspected program reaches a static breakpoint, the host runtime
//! hands control to [`Inspector::static_debug`], which opens a small text
//! console over the stopped program's live state:
//! - Allocated objects, their dynamic types and sizes
//! - String and array contents, decoded from raw object memory
//! - Read and loaded assemblies and the types they define
//! - The current call stack
//!
//! ## Layers
//!
//! - [`runtime`]: the facade the host implements ([`Runtime`]) and an
//!   in-memory implementation ([`runtime::heap::HeapImage`])
//! - [`object`] and [`render`]: type-directed decoding and rendering
//! - [`reports`]: allocation, assembly and type listings
//! - [`command`] and [`session`]: parsing and the console loop
//! - [`inspector`]: the breakpoint entry point
//!
//! The inspector never writes to the inspected program. Everything it needs
//! from the runtime is read through [`Runtime`].

pub mod command;
pub mod error;
pub mod inspector;
pub mod object;
pub mod prelude;
pub mod render;
pub mod reports;
pub mod runtime;
pub mod session;
pub mod types;

pub use error::{UldError, UldResult};
pub use inspector::Inspector;
pub use runtime::Runtime;
pub use session::{Session, SessionOutcome};
