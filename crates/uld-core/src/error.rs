//! # Error Types
//!
//! General error handling for the inspector.
//!
//! We use `thiserror` to automatically generate `Error` trait implementations
//! and nice error messages.

use thiserror::Error;

use crate::types::Address;

/// Main error type for inspector operations
///
/// This enum represents all the ways that reading and decoding a live object
/// can fail. None of these are fatal to a console session: the session prints
/// the message and prompts again.
///
/// ## Error Categories
///
/// 1. **Lookup errors**: NotAnObject, UnknownType, InvalidAddress
/// 2. **Layout errors**: MissingElementType, Truncated, NegativeLength
/// 3. **I/O errors**: Io (console reads and writes)
#[derive(Error, Debug)]
pub enum UldError
{
    /// The address is not a key of the allocation table
    #[error("{0} is not an allocated object")]
    NotAnObject(Address),

    /// The type tag of the object does not name a type the runtime knows about
    #[error("No type registered for the object at {0}")]
    UnknownType(Address),

    /// The memory range is not backed by any allocation
    ///
    /// Returned by [`Runtime::read_memory`](crate::runtime::Runtime::read_memory)
    /// implementations when the requested range crosses the end of an
    /// allocation or starts outside of one.
    #[error("Cannot read {len} bytes at {address}")]
    InvalidAddress
    {
        /// Start of the requested range
        address: Address,
        /// Number of bytes requested
        len: usize,
    },

    /// An array type without element type metadata
    #[error("Array type '{0}' has no element type")]
    MissingElementType(String),

    /// A length or count field points past the end of the allocation
    ///
    /// The object claims `needed` bytes but the allocation table only backs
    /// `available` of them.
    #[error("Object at {address} needs {needed} bytes but only {available} are allocated")]
    Truncated
    {
        /// Object address
        address: Address,
        /// Bytes the layout asks for
        needed: usize,
        /// Bytes the allocation actually has
        available: usize,
    },

    /// A length or count field holds a negative value
    #[error("Object at {address} has a negative length field ({value})")]
    NegativeLength
    {
        /// Object address
        address: Address,
        /// The raw value read
        value: i32,
    },

    /// I/O error on the console streams
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Convenience type alias for `Result<T, UldError>`
///
/// ```rust
/// use uld_core::error::UldResult;
/// fn foo() -> UldResult<()>
/// {
///     Ok(())
/// }
/// ```
pub type UldResult<T> = std::result::Result<T, UldError>;
