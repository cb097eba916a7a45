//! # Runtime Facade
//!
//! The interface the inspector consumes from the host runtime.
//!
//! The inspector has no static knowledge of the inspected program. Everything
//! it shows (dynamic types, display names, object bytes, registries, the
//! stack) comes through this trait, which the host implements over its own
//! type system, allocator, assembly loader and stack walker.
//!
//! ## Suspension contract
//!
//! An [`Inspector`](crate::inspector::Inspector) borrows the runtime
//! immutably for as long as it lives. Implementors must keep every other
//! mutator thread of the inspected program suspended while a breakpoint
//! session runs. The registries are read without locks and without a
//! snapshot, so results are only meaningful while that holds.

pub mod heap;

use std::sync::Arc;

use crate::error::UldResult;
use crate::types::{Address, AllocationTable, AssemblyCatalog, MemberDescriptor, TypeDescriptor, TypeRef};

/// Fully-qualified name of the built-in string type.
pub const STRING_TYPE_NAME: &str = "[System]String";

/// Size of the type tag at the start of every object.
pub const TYPE_TAG_SIZE: usize = 8;

/// Size of the length field of strings and the count field of arrays.
pub const LENGTH_FIELD_SIZE: usize = 4;

/// Size of one reference slot in a reference-type array.
pub const POINTER_SIZE: usize = 8;

/// Read-only view of the host runtime
///
/// ## Why a trait?
///
/// The same console runs against the real runtime and against a
/// [`HeapImage`](heap::HeapImage) in tests and in the reference host.
pub trait Runtime
{
    /// Dynamic type of the object at `object`.
    ///
    /// Returns `None` when the tag does not name a known type.
    fn type_of(&self, object: Address) -> Option<TypeRef>;

    /// Human-readable name of a type.
    fn display_name(&self, ty: &TypeDescriptor) -> String;

    /// Human-readable name of a member, including its declaring type.
    fn member_display_name(&self, member: &MemberDescriptor) -> String;

    /// Look a type up by fully-qualified name.
    fn type_by_name(&self, qualified_name: &str) -> Option<TypeRef>;

    /// Formatted stack trace of the current thread, dropping the `skip`
    /// innermost frames.
    fn stack_trace(&self, skip: usize) -> String;

    /// Member whose generic static storage lives at `address`.
    fn resolve_member(&self, address: Address) -> Option<Arc<MemberDescriptor>>;

    /// Read `len` bytes starting at `addr`.
    ///
    /// ## Errors
    ///
    /// - `InvalidAddress`: the range is not backed by live memory
    fn read_memory(&self, addr: Address, len: usize) -> UldResult<Vec<u8>>;

    /// Live allocation table.
    fn allocations(&self) -> &AllocationTable;

    /// Read and loaded assemblies.
    fn assemblies(&self) -> &AssemblyCatalog;

    /// Whether `ty` is the built-in string type.
    fn is_string_type(&self, ty: &TypeDescriptor) -> bool
    {
        self.type_by_name(STRING_TYPE_NAME)
            .is_some_and(|string| string.id() == ty.id())
    }
}
