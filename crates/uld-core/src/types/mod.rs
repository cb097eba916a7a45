//! # Types
//!
//! Data model shared by every part of the inspector.
//!
//! All of these describe state owned by the host runtime: addresses of live
//! objects, type and member metadata, the allocation table, the assembly
//! catalog and the location of the breakpoint that stopped the program.

pub mod address;
pub mod breakpoint;
pub mod metadata;
pub mod registry;

// Re-export all public types
pub use address::{Address, AddressParseError};
pub use breakpoint::BreakpointContext;
pub use metadata::{MemberDescriptor, MemberGroup, MemberKind, TypeBuilder, TypeDescriptor, TypeId, TypeKind, TypeRef};
pub use registry::{AllocationTable, Assembly, AssemblyCatalog};
