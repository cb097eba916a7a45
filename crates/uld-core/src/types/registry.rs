//! Allocation table and assembly catalog.
//!
//! Both registries belong to the host runtime, which records into them during
//! normal execution. The inspector reads them through
//! [`Runtime`](crate::runtime::Runtime) while the program is stopped.

use std::collections::{btree_map, btree_set, BTreeMap, BTreeSet};
use std::sync::Arc;

use super::{Address, TypeRef};

/// Live allocations: object address to allocation size in bytes.
///
/// The running total is kept in step with every [`record`](Self::record) and
/// [`release`](Self::release), so it always equals the sum of the sizes.
#[derive(Debug, Clone, Default)]
pub struct AllocationTable
{
    objects: BTreeMap<Address, usize>,
    total_size: usize,
    field_offsets: BTreeSet<Address>,
}

impl AllocationTable
{
    /// Create an empty table.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record a live allocation. Re-recording an address replaces its size.
    pub fn record(&mut self, address: Address, size: usize)
    {
        if let Some(previous) = self.objects.insert(address, size) {
            self.total_size -= previous;
        }
        self.total_size += size;
    }

    /// Forget an allocation, returning its size if it was live.
    pub fn release(&mut self, address: Address) -> Option<usize>
    {
        let size = self.objects.remove(&address)?;
        self.total_size -= size;
        self.field_offsets.remove(&address);
        Some(size)
    }

    /// Mark an address as backing a generic static field slot.
    pub fn record_field_offset(&mut self, address: Address)
    {
        self.field_offsets.insert(address);
    }

    /// Allocation size for `address` if it is a live object.
    pub fn size_of(&self, address: Address) -> Option<usize>
    {
        self.objects.get(&address).copied()
    }

    /// Whether `address` is a live object.
    pub fn contains(&self, address: Address) -> bool
    {
        self.objects.contains_key(&address)
    }

    /// Live allocations in address order.
    pub fn iter(&self) -> btree_map::Iter<'_, Address, usize>
    {
        self.objects.iter()
    }

    /// Number of live objects.
    pub fn len(&self) -> usize
    {
        self.objects.len()
    }

    /// Whether there are no live objects.
    pub fn is_empty(&self) -> bool
    {
        self.objects.is_empty()
    }

    /// Sum of all allocation sizes.
    pub const fn total_size(&self) -> usize
    {
        self.total_size
    }

    /// Addresses allocated for generic static field storage.
    pub fn field_offsets(&self) -> btree_set::Iter<'_, Address>
    {
        self.field_offsets.iter()
    }
}

/// One assembly and the types it defines.
#[derive(Debug, Clone, Default)]
pub struct Assembly
{
    name: String,
    types: BTreeMap<String, TypeRef>,
}

impl Assembly
{
    /// Create an empty assembly.
    pub fn new(name: impl Into<String>) -> Self
    {
        Self {
            name: name.into(),
            types: BTreeMap::new(),
        }
    }

    /// Add a type under its fully-qualified name.
    #[must_use]
    pub fn with_type(mut self, ty: TypeRef) -> Self
    {
        self.types.insert(ty.name().to_string(), ty);
        self
    }

    /// Assembly name.
    pub fn name(&self) -> &str
    {
        &self.name
    }

    /// Types by name.
    pub fn types(&self) -> btree_map::Iter<'_, String, TypeRef>
    {
        self.types.iter()
    }

    /// Number of types defined.
    pub fn type_count(&self) -> usize
    {
        self.types.len()
    }
}

/// Every assembly whose metadata was read, and the subset that is fully loaded.
#[derive(Debug, Clone, Default)]
pub struct AssemblyCatalog
{
    read: BTreeMap<String, Arc<Assembly>>,
    loaded: BTreeMap<String, Arc<Assembly>>,
}

impl AssemblyCatalog
{
    /// Create an empty catalog.
    #[must_use]
    pub fn new() -> Self
    {
        Self::default()
    }

    /// Record that an assembly's metadata has been read.
    pub fn insert_read(&mut self, assembly: Assembly) -> Arc<Assembly>
    {
        let assembly = Arc::new(assembly);
        self.read.insert(assembly.name().to_string(), Arc::clone(&assembly));
        assembly
    }

    /// Promote a read assembly to loaded.
    ///
    /// Returns `false` when no assembly of that name has been read, which
    /// keeps every loaded assembly present in the read map.
    pub fn mark_loaded(&mut self, name: &str) -> bool
    {
        match self.read.get(name) {
            Some(assembly) => {
                self.loaded.insert(name.to_string(), Arc::clone(assembly));
                true
            }
            None => false,
        }
    }

    /// Assemblies whose metadata has been read, by name.
    pub fn read(&self) -> btree_map::Iter<'_, String, Arc<Assembly>>
    {
        self.read.iter()
    }

    /// Whether `name` is fully loaded.
    pub fn is_loaded(&self, name: &str) -> bool
    {
        self.loaded.contains_key(name)
    }

    /// Find a type by fully-qualified name in any read assembly.
    pub fn find_type(&self, name: &str) -> Option<&TypeRef>
    {
        self.read.values().find_map(|assembly| assembly.types.get(name))
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::types::{TypeDescriptor, TypeId, TypeKind};

    #[test]
    fn test_running_total_tracks_records()
    {
        let mut table = AllocationTable::new();
        table.record(Address::new(0x1000), 24);
        table.record(Address::new(0x1020), 16);
        assert_eq!(table.total_size(), 40);

        table.record(Address::new(0x1000), 32);
        assert_eq!(table.total_size(), 48);
        assert_eq!(table.len(), 2);

        assert_eq!(table.release(Address::new(0x1020)), Some(16));
        assert_eq!(table.release(Address::new(0x1020)), None);
        assert_eq!(table.total_size(), 32);
    }

    #[test]
    fn test_release_drops_field_offset_mark()
    {
        let mut table = AllocationTable::new();
        table.record(Address::new(0x2000), 8);
        table.record_field_offset(Address::new(0x2000));
        assert_eq!(table.field_offsets().count(), 1);

        table.release(Address::new(0x2000));
        assert_eq!(table.field_offsets().count(), 0);
    }

    #[test]
    fn test_loaded_requires_read()
    {
        let mut catalog = AssemblyCatalog::new();
        assert!(!catalog.mark_loaded("System"));

        catalog.insert_read(Assembly::new("System"));
        assert!(catalog.mark_loaded("System"));
        assert!(catalog.is_loaded("System"));
        assert!(!catalog.is_loaded("App"));
    }

    #[test]
    fn test_find_type_across_assemblies()
    {
        let ty = Arc::new(TypeDescriptor::builder(TypeId::from_raw(1), "[Lib]Lib.Thing", TypeKind::Class).build());
        let mut catalog = AssemblyCatalog::new();
        catalog.insert_read(Assembly::new("App"));
        catalog.insert_read(Assembly::new("Lib").with_type(Arc::clone(&ty)));

        assert_eq!(catalog.find_type("[Lib]Lib.Thing").map(|t| t.id()), Some(ty.id()));
        assert!(catalog.find_type("[Lib]Lib.Missing").is_none());
    }
}
