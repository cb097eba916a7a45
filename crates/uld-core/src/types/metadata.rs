//! Runtime type metadata.
//!
//! Type and member descriptors are owned by the host runtime. The inspector
//! only ever holds shared references ([`TypeRef`]) to them and never mutates
//! them after they are built.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use smallvec::SmallVec;

/// Shared handle to a type descriptor.
pub type TypeRef = Arc<TypeDescriptor>;

/// Members sharing one name (overloads), in declaration order.
pub type MemberGroup = SmallVec<[Arc<MemberDescriptor>; 1]>;

/// Numeric identity of a runtime type.
///
/// This is the value stored in the type tag at the start of every object.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TypeId(u64);

impl TypeId
{
    /// Create an identifier from a raw tag value.
    #[must_use]
    pub const fn from_raw(value: u64) -> Self
    {
        Self(value)
    }

    /// Raw tag value.
    #[must_use]
    pub const fn raw(self) -> u64
    {
        self.0
    }
}

impl fmt::Display for TypeId
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result
    {
        write!(f, "#{}", self.0)
    }
}

/// How a type was declared.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeKind
{
    /// Reference type.
    Class,
    /// Value type stored inline.
    Struct,
    /// Interface (never the dynamic type of an object, but present in catalogs).
    Interface,
    /// Enumeration; stored inline like a struct.
    Enum,
    /// Single-dimensional array. Carries an element type.
    Array,
}

/// What a member is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MemberKind
{
    /// Instance or static field.
    Field,
    /// Method.
    Method,
    /// Property accessor pair.
    Property,
    /// Constructor.
    Constructor,
    /// Anything else the runtime records.
    Other,
}

/// A single member of a type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberDescriptor
{
    name: String,
    kind: MemberKind,
    declaring_type: TypeId,
}

impl MemberDescriptor
{
    /// Describe a member declared on `declaring_type`.
    pub fn new(name: impl Into<String>, kind: MemberKind, declaring_type: TypeId) -> Self
    {
        Self {
            name: name.into(),
            kind,
            declaring_type,
        }
    }

    /// Member name as declared.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Member kind.
    pub const fn kind(&self) -> MemberKind
    {
        self.kind
    }

    /// Type that declares this member.
    pub const fn declaring_type(&self) -> TypeId
    {
        self.declaring_type
    }

    /// Whether this member is a field.
    pub fn is_field(&self) -> bool
    {
        self.kind == MemberKind::Field
    }
}

/// Metadata describing one runtime type.
///
/// Construct with [`TypeDescriptor::builder`]:
///
/// ```rust
/// use uld_core::types::{MemberKind, TypeDescriptor, TypeId, TypeKind};
///
/// let point = TypeDescriptor::builder(TypeId::from_raw(7), "[Geometry]Geometry.Point", TypeKind::Struct)
///     .with_member("X", MemberKind::Field)
///     .with_member("Y", MemberKind::Field)
///     .with_member("Length", MemberKind::Method)
///     .build();
///
/// assert!(point.is_boxable_struct());
/// assert_eq!(point.fields().count(), 2);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeDescriptor
{
    id: TypeId,
    name: String,
    kind: TypeKind,
    element_type: Option<TypeRef>,
    members: BTreeMap<String, MemberGroup>,
}

impl TypeDescriptor
{
    /// Start describing a type.
    ///
    /// `name` is the fully-qualified name, `[Assembly]Namespace.Name`.
    pub fn builder(id: TypeId, name: impl Into<String>, kind: TypeKind) -> TypeBuilder
    {
        TypeBuilder {
            descriptor: TypeDescriptor {
                id,
                name: name.into(),
                kind,
                element_type: None,
                members: BTreeMap::new(),
            },
        }
    }

    /// Identity of the type; also the object tag value.
    pub const fn id(&self) -> TypeId
    {
        self.id
    }

    /// Fully-qualified name.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Whether this is an array type.
    pub fn is_array(&self) -> bool
    {
        self.kind == TypeKind::Array
    }

    /// Element type of an array type.
    pub fn element_type(&self) -> Option<&TypeRef>
    {
        self.element_type.as_ref()
    }

    /// Whether values of this type are stored inline in their container.
    ///
    /// Array elements of such a type have no address of their own.
    pub fn is_boxable_struct(&self) -> bool
    {
        matches!(self.kind, TypeKind::Struct | TypeKind::Enum)
    }

    /// Members registered under `name`.
    pub fn member(&self, name: &str) -> Option<&MemberGroup>
    {
        self.members.get(name)
    }

    /// Member groups whose first entry is a field, ordered by name.
    pub fn fields(&self) -> impl Iterator<Item = (&str, &Arc<MemberDescriptor>)> + '_
    {
        self.members.iter().filter_map(|(name, group)| {
            group
                .first()
                .filter(|member| member.is_field())
                .map(|member| (name.as_str(), member))
        })
    }
}

/// Consuming builder for [`TypeDescriptor`].
#[derive(Debug)]
pub struct TypeBuilder
{
    descriptor: TypeDescriptor,
}

impl TypeBuilder
{
    /// Set the element type (arrays only).
    #[must_use]
    pub fn with_element_type(mut self, element: TypeRef) -> Self
    {
        self.descriptor.element_type = Some(element);
        self
    }

    /// Add a member declared on this type.
    ///
    /// Members with the same name are grouped in the order they are added.
    #[must_use]
    pub fn with_member(mut self, name: &str, kind: MemberKind) -> Self
    {
        let member = Arc::new(MemberDescriptor::new(name, kind, self.descriptor.id));
        self.descriptor
            .members
            .entry(name.to_string())
            .or_default()
            .push(member);
        self
    }

    /// Finish the descriptor.
    #[must_use]
    pub fn build(self) -> TypeDescriptor
    {
        self.descriptor
    }
}

#[cfg(test)]
mod tests
{
    use super::*;

    fn sample() -> TypeDescriptor
    {
        TypeDescriptor::builder(TypeId::from_raw(3), "[App]App.Node", TypeKind::Class)
            .with_member("next", MemberKind::Field)
            .with_member("Visit", MemberKind::Method)
            .with_member("Visit", MemberKind::Method)
            .with_member("value", MemberKind::Field)
            .with_member(".ctor", MemberKind::Constructor)
            .build()
    }

    #[test]
    fn test_members_group_overloads()
    {
        let ty = sample();
        assert_eq!(ty.member("Visit").map(SmallVec::len), Some(2));
        assert_eq!(ty.member(".ctor").map(SmallVec::len), Some(1));
        assert!(ty.member("Missing").is_none());
    }

    #[test]
    fn test_fields_are_name_ordered()
    {
        let ty = sample();
        let names: Vec<&str> = ty.fields().map(|(name, _)| name).collect();
        assert_eq!(names, vec!["next", "value"]);
    }

    #[test]
    fn test_fields_use_first_member_kind()
    {
        let ty = TypeDescriptor::builder(TypeId::from_raw(4), "[App]App.Odd", TypeKind::Class)
            .with_member("Count", MemberKind::Property)
            .with_member("Count", MemberKind::Field)
            .build();
        assert_eq!(ty.fields().count(), 0);
    }

    #[test]
    fn test_boxable_kinds()
    {
        let kinds = [
            (TypeKind::Class, false),
            (TypeKind::Struct, true),
            (TypeKind::Interface, false),
            (TypeKind::Enum, true),
            (TypeKind::Array, false),
        ];
        for (kind, boxable) in kinds {
            let ty = TypeDescriptor::builder(TypeId::from_raw(1), "[T]T", kind).build();
            assert_eq!(ty.is_boxable_struct(), boxable, "{kind:?}");
        }
    }
}
