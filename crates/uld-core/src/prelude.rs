//! Common module for library exports

pub use crate::error::{UldError, UldResult};
pub use crate::inspector::Inspector;
pub use crate::runtime::heap::HeapImage;
pub use crate::runtime::{Runtime, STRING_TYPE_NAME};
pub use crate::session::{Session, SessionOutcome};
pub use crate::types::{
    Address, Assembly, BreakpointContext, MemberDescriptor, MemberKind, TypeDescriptor, TypeId, TypeKind, TypeRef,
};
