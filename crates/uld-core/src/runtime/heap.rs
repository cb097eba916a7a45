//! # Heap Image
//!
//! An in-memory [`Runtime`] that owns the bytes of every object it allocates.
//!
//! Objects are laid out exactly as the real runtime lays them out: an 8-byte
//! little-endian type tag, then the type-specific payload. The image is used
//! by the reference host binary and by tests, where it stands in for a
//! stopped program.
//!
//! ## Example
//!
//! ```rust
//! use uld_core::runtime::heap::HeapImage;
//! use uld_core::runtime::Runtime;
//!
//! let mut heap = HeapImage::new();
//! let greeting = heap.alloc_string(b"hello");
//!
//! assert_eq!(heap.allocations().size_of(greeting), Some(24));
//! let ty = heap.type_of(greeting).unwrap();
//! assert_eq!(heap.display_name(&ty), "String");
//! ```

use std::collections::{BTreeMap, HashMap};
use std::sync::Arc;

use super::{Runtime, LENGTH_FIELD_SIZE, STRING_TYPE_NAME, TYPE_TAG_SIZE};
use crate::error::{UldError, UldResult};
use crate::types::{
    Address, AllocationTable, Assembly, AssemblyCatalog, MemberDescriptor, TypeDescriptor, TypeId, TypeKind, TypeRef,
};

/// First address handed out by a fresh image.
pub const HEAP_BASE: u64 = 0x1000;

/// Allocation granularity in bytes.
const ALIGNMENT: usize = 8;

/// A stopped program's heap, types, assemblies and stack, held in memory.
#[derive(Debug)]
pub struct HeapImage
{
    memory: BTreeMap<Address, Vec<u8>>,
    types: HashMap<TypeId, TypeRef>,
    types_by_name: HashMap<String, TypeRef>,
    allocations: AllocationTable,
    static_slots: HashMap<Address, Arc<MemberDescriptor>>,
    catalog: AssemblyCatalog,
    frames: Vec<String>,
    string_type: TypeRef,
    next_address: u64,
    next_type_id: u64,
}

impl Default for HeapImage
{
    fn default() -> Self
    {
        Self::new()
    }
}

impl HeapImage
{
    /// Create an empty image with the built-in string type defined.
    ///
    /// The string type is not listed in any assembly; add a `System`
    /// assembly with [`add_assembly`](Self::add_assembly) if reports should
    /// show it.
    #[must_use]
    pub fn new() -> Self
    {
        let string_type = Arc::new(TypeDescriptor::builder(TypeId::from_raw(1), STRING_TYPE_NAME, TypeKind::Class).build());

        let mut image = Self {
            memory: BTreeMap::new(),
            types: HashMap::new(),
            types_by_name: HashMap::new(),
            allocations: AllocationTable::new(),
            static_slots: HashMap::new(),
            catalog: AssemblyCatalog::new(),
            frames: Vec::new(),
            string_type: Arc::clone(&string_type),
            next_address: HEAP_BASE,
            next_type_id: 2,
        };
        image.register(string_type);
        image
    }

    /// The built-in string type.
    pub fn string_type(&self) -> &TypeRef
    {
        &self.string_type
    }

    /// Reserve an identifier for a type that is about to be described.
    pub fn fresh_type_id(&mut self) -> TypeId
    {
        let id = TypeId::from_raw(self.next_type_id);
        self.next_type_id += 1;
        id
    }

    /// Make a type known to the image so objects can be tagged with it.
    pub fn define_type(&mut self, descriptor: TypeDescriptor) -> TypeRef
    {
        let ty = Arc::new(descriptor);
        self.register(Arc::clone(&ty));
        ty
    }

    fn register(&mut self, ty: TypeRef)
    {
        self.types_by_name.insert(ty.name().to_string(), Arc::clone(&ty));
        self.types.insert(ty.id(), ty);
    }

    /// Add an assembly to the catalog, optionally as fully loaded.
    pub fn add_assembly(&mut self, assembly: Assembly, loaded: bool)
    {
        let name = assembly.name().to_string();
        self.catalog.insert_read(assembly);
        if loaded {
            self.catalog.mark_loaded(&name);
        }
    }

    /// Push a new innermost stack frame.
    pub fn push_frame(&mut self, frame: impl Into<String>)
    {
        self.frames.push(frame.into());
    }

    /// Allocate an object of `ty` with the given payload after the tag.
    ///
    /// The allocation size is the tag plus payload, rounded up to 8 bytes.
    pub fn alloc_raw(&mut self, ty: &TypeDescriptor, payload: &[u8]) -> Address
    {
        let size = (TYPE_TAG_SIZE + payload.len()).next_multiple_of(ALIGNMENT);
        let mut bytes = vec![0u8; size];
        bytes[..TYPE_TAG_SIZE].copy_from_slice(&ty.id().raw().to_le_bytes());
        bytes[TYPE_TAG_SIZE..TYPE_TAG_SIZE + payload.len()].copy_from_slice(payload);

        let address = Address::new(self.next_address);
        self.next_address += size as u64;
        self.memory.insert(address, bytes);
        self.allocations.record(address, size);
        address
    }

    /// Allocate an object of `ty` with `payload_len` zeroed payload bytes.
    pub fn alloc_object(&mut self, ty: &TypeDescriptor, payload_len: usize) -> Address
    {
        self.alloc_raw(ty, &vec![0u8; payload_len])
    }

    /// Allocate a string holding exactly `content`.
    pub fn alloc_string(&mut self, content: &[u8]) -> Address
    {
        let mut payload = length_field(content.len());
        payload.extend_from_slice(content);
        let string_type = Arc::clone(&self.string_type);
        self.alloc_raw(&string_type, &payload)
    }

    /// Allocate an array of `count` inline elements of `element_size` bytes.
    pub fn alloc_value_array(&mut self, array_type: &TypeDescriptor, count: usize, element_size: usize) -> Address
    {
        let mut payload = length_field(count);
        payload.resize(LENGTH_FIELD_SIZE + count * element_size, 0);
        self.alloc_raw(array_type, &payload)
    }

    /// Allocate an array of references to `elements`.
    pub fn alloc_ref_array(&mut self, array_type: &TypeDescriptor, elements: &[Address]) -> Address
    {
        let mut payload = length_field(elements.len());
        for element in elements {
            payload.extend_from_slice(&element.value().to_le_bytes());
        }
        self.alloc_raw(array_type, &payload)
    }

    /// Allocate generic static field storage for `member`.
    ///
    /// The storage is an ordinary live object of `storage_type`, additionally
    /// marked as a field-offset allocation that resolves back to `member`.
    pub fn alloc_field_offset(
        &mut self,
        storage_type: &TypeDescriptor,
        member: Arc<MemberDescriptor>,
        payload_len: usize,
    ) -> Address
    {
        let address = self.alloc_object(storage_type, payload_len);
        self.allocations.record_field_offset(address);
        self.static_slots.insert(address, member);
        address
    }

    /// Overwrite bytes of a live allocation, starting `offset` bytes past
    /// its address.
    ///
    /// ## Errors
    ///
    /// - `InvalidAddress`: `address` is not live or the write crosses its end
    pub fn write_bytes(&mut self, address: Address, offset: usize, data: &[u8]) -> UldResult<()>
    {
        let bytes = self.memory.get_mut(&address).ok_or(UldError::InvalidAddress {
            address,
            len: data.len(),
        })?;
        let end = offset
            .checked_add(data.len())
            .filter(|end| *end <= bytes.len())
            .ok_or(UldError::InvalidAddress {
                address: address + offset as u64,
                len: data.len(),
            })?;
        bytes[offset..end].copy_from_slice(data);
        Ok(())
    }

    /// Free an allocation.
    pub fn release(&mut self, address: Address) -> Option<usize>
    {
        self.memory.remove(&address);
        self.static_slots.remove(&address);
        self.allocations.release(address)
    }

    fn type_by_id(&self, id: TypeId) -> Option<&TypeRef>
    {
        self.types.get(&id)
    }
}

/// Length fields are signed 32-bit; callers must stay within `i32::MAX`.
fn length_field(len: usize) -> Vec<u8>
{
    debug_assert!(
        i32::try_from(len).is_ok(),
        "length {len} does not fit the 4-byte length field"
    );
    let len = i32::try_from(len).unwrap_or(i32::MAX);
    len.to_le_bytes().to_vec()
}

/// Drop the `[Assembly]` prefix of a fully-qualified name.
fn strip_assembly(name: &str) -> &str
{
    if name.starts_with('[') {
        name.split_once(']').map_or(name, |(_, rest)| rest)
    } else {
        name
    }
}

impl Runtime for HeapImage
{
    fn type_of(&self, object: Address) -> Option<TypeRef>
    {
        let bytes = self.memory.get(&object)?;
        let tag: [u8; TYPE_TAG_SIZE] = bytes.get(..TYPE_TAG_SIZE)?.try_into().ok()?;
        self.type_by_id(TypeId::from_raw(u64::from_le_bytes(tag))).cloned()
    }

    fn display_name(&self, ty: &TypeDescriptor) -> String
    {
        strip_assembly(ty.name()).to_string()
    }

    fn member_display_name(&self, member: &MemberDescriptor) -> String
    {
        match self.type_by_id(member.declaring_type()) {
            Some(owner) => format!("{}.{}", self.display_name(owner), member.name()),
            None => format!("{}.{}", member.declaring_type(), member.name()),
        }
    }

    fn type_by_name(&self, qualified_name: &str) -> Option<TypeRef>
    {
        // Types listed by an assembly but never defined on the image still resolve
        self.types_by_name
            .get(qualified_name)
            .or_else(|| self.catalog.find_type(qualified_name))
            .cloned()
    }

    fn stack_trace(&self, skip: usize) -> String
    {
        self.frames
            .iter()
            .rev()
            .skip(skip)
            .map(|frame| format!("  at {frame}"))
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn resolve_member(&self, address: Address) -> Option<Arc<MemberDescriptor>>
    {
        self.static_slots.get(&address).cloned()
    }

    fn read_memory(&self, addr: Address, len: usize) -> UldResult<Vec<u8>>
    {
        let invalid = || UldError::InvalidAddress { address: addr, len };

        let (start, bytes) = self.memory.range(..=addr).next_back().ok_or_else(invalid)?;
        let offset = usize::try_from(addr.value() - start.value()).map_err(|_| invalid())?;
        let end = offset.checked_add(len).ok_or_else(invalid)?;

        bytes.get(offset..end).map(<[u8]>::to_vec).ok_or_else(invalid)
    }

    fn allocations(&self) -> &AllocationTable
    {
        &self.allocations
    }

    fn assemblies(&self) -> &AssemblyCatalog
    {
        &self.catalog
    }
}
