//! # Object Views
//!
//! Bounds-checked decoding of live objects.
//!
//! A live object is `[type tag][payload]`, and only its dynamic type says
//! what the payload holds. [`ObjectView`] loads the whole allocation once and
//! exposes the payload as an [`ObjectBody`] for the shape the type
//! guarantees. Every length and count field is checked against the
//! allocation size before the bytes behind it are touched, so a corrupt or
//! misidentified object becomes an error instead of a wild read.

use tracing::trace;

use crate::error::{UldError, UldResult};
use crate::runtime::{Runtime, LENGTH_FIELD_SIZE, POINTER_SIZE, TYPE_TAG_SIZE};
use crate::types::{Address, TypeRef};

/// Payload of a decoded object.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ObjectBody<'a>
{
    /// The built-in string type: exactly `length` raw bytes.
    String(&'a [u8]),
    /// Array whose elements are stored inline.
    ValueArray
    {
        /// Element type shared by every slot
        element: TypeRef,
        /// Number of elements
        count: usize,
    },
    /// Array of references to other heap objects.
    ReferenceArray
    {
        /// Declared element type
        element: TypeRef,
        /// Literal slot values, in order
        slots: Vec<Address>,
    },
    /// Anything else: no payload is decoded.
    Plain,
}

/// A live object loaded from the runtime.
#[derive(Debug, Clone)]
pub struct ObjectView
{
    address: Address,
    ty: TypeRef,
    bytes: Vec<u8>,
}

impl ObjectView
{
    /// Load the object at `address`.
    ///
    /// ## Errors
    ///
    /// - `NotAnObject`: `address` is not in the allocation table
    /// - `UnknownType`: the type tag names no known type
    /// - `InvalidAddress`: the runtime could not read the allocation
    pub fn load(runtime: &dyn Runtime, address: Address) -> UldResult<Self>
    {
        let size = runtime
            .allocations()
            .size_of(address)
            .ok_or(UldError::NotAnObject(address))?;
        let ty = runtime.type_of(address).ok_or(UldError::UnknownType(address))?;
        let bytes = runtime.read_memory(address, size)?;
        trace!(%address, size, ty = ty.name(), "loaded object");

        Ok(Self { address, ty, bytes })
    }

    /// Dynamic type.
    pub fn ty(&self) -> &TypeRef
    {
        &self.ty
    }

    /// Decode the payload according to the dynamic type.
    ///
    /// ## Errors
    ///
    /// - `NegativeLength`: the length or count field is negative
    /// - `Truncated`: the payload runs past the allocation
    /// - `MissingElementType`: an array type without element metadata
    pub fn body(&self, runtime: &dyn Runtime) -> UldResult<ObjectBody<'_>>
    {
        if runtime.is_string_type(&self.ty) {
            let len = self.length_field()?;
            let bytes = self.slice(TYPE_TAG_SIZE + LENGTH_FIELD_SIZE, len)?;
            return Ok(ObjectBody::String(bytes));
        }

        if !self.ty.is_array() {
            return Ok(ObjectBody::Plain);
        }

        let element = self
            .ty
            .element_type()
            .cloned()
            .ok_or_else(|| UldError::MissingElementType(self.ty.name().to_string()))?;
        let count = self.length_field()?;

        if element.is_boxable_struct() {
            // Inline elements take at least one byte each
            self.slice(TYPE_TAG_SIZE + LENGTH_FIELD_SIZE, count)?;
            return Ok(ObjectBody::ValueArray { element, count });
        }

        let table_len = count.checked_mul(POINTER_SIZE).ok_or(UldError::Truncated {
            address: self.address,
            needed: usize::MAX,
            available: self.bytes.len(),
        })?;
        let table = self.slice(TYPE_TAG_SIZE + LENGTH_FIELD_SIZE, table_len)?;
        let slots = table
            .chunks_exact(POINTER_SIZE)
            .map(|slot| {
                let mut raw = [0u8; POINTER_SIZE];
                raw.copy_from_slice(slot);
                Address::new(u64::from_le_bytes(raw))
            })
            .collect();

        Ok(ObjectBody::ReferenceArray { element, slots })
    }

    /// The 4-byte length or count field right after the tag.
    fn length_field(&self) -> UldResult<usize>
    {
        let raw = self.slice(TYPE_TAG_SIZE, LENGTH_FIELD_SIZE)?;
        let mut buf = [0u8; LENGTH_FIELD_SIZE];
        buf.copy_from_slice(raw);
        let value = i32::from_le_bytes(buf);

        usize::try_from(value).map_err(|_| UldError::NegativeLength {
            address: self.address,
            value,
        })
    }

    fn slice(&self, offset: usize, len: usize) -> UldResult<&[u8]>
    {
        let truncated = || UldError::Truncated {
            address: self.address,
            needed: offset.saturating_add(len),
            available: self.bytes.len(),
        };
        let end = offset.checked_add(len).ok_or_else(truncated)?;
        self.bytes.get(offset..end).ok_or_else(truncated)
    }
}

#[cfg(test)]
mod tests
{
    use super::*;
    use crate::runtime::heap::HeapImage;
    use crate::types::{TypeDescriptor, TypeKind};

    #[test]
    fn test_string_body()
    {
        let mut heap = HeapImage::new();
        let addr = heap.alloc_string(b"a\0b");
        let view = ObjectView::load(&heap, addr).unwrap();
        assert_eq!(view.body(&heap).unwrap(), ObjectBody::String(b"a\0b"));
    }

    #[test]
    fn test_string_length_past_allocation()
    {
        let mut heap = HeapImage::new();
        let addr = heap.alloc_string(b"abc");
        heap.write_bytes(addr, TYPE_TAG_SIZE, &100i32.to_le_bytes()).unwrap();

        let view = ObjectView::load(&heap, addr).unwrap();
        match view.body(&heap) {
            Err(UldError::Truncated { needed, available, .. }) => {
                assert_eq!(needed, 112);
                assert_eq!(available, 16);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn test_negative_length()
    {
        let mut heap = HeapImage::new();
        let addr = heap.alloc_string(b"abc");
        heap.write_bytes(addr, TYPE_TAG_SIZE, &(-2i32).to_le_bytes()).unwrap();

        let view = ObjectView::load(&heap, addr).unwrap();
        assert!(matches!(view.body(&heap), Err(UldError::NegativeLength { value: -2, .. })));
    }

    #[test]
    fn test_reference_array_slots()
    {
        let mut heap = HeapImage::new();
        let string = heap.string_type().clone();
        let id = heap.fresh_type_id();
        let array = heap.define_type(
            TypeDescriptor::builder(id, "[System]String[]", TypeKind::Array)
                .with_element_type(string)
                .build(),
        );
        let a = heap.alloc_string(b"a");
        let arr = heap.alloc_ref_array(&array, &[a, Address::NULL]);

        let view = ObjectView::load(&heap, arr).unwrap();
        match view.body(&heap).unwrap() {
            ObjectBody::ReferenceArray { slots, .. } => assert_eq!(slots, vec![a, Address::NULL]),
            other => panic!("expected ReferenceArray, got {other:?}"),
        }
    }

    #[test]
    fn test_value_array_count_past_allocation()
    {
        let mut heap = HeapImage::new();
        let id = heap.fresh_type_id();
        let int32 = heap.define_type(TypeDescriptor::builder(id, "[System]System.Int32", TypeKind::Struct).build());
        let id = heap.fresh_type_id();
        let array = heap.define_type(
            TypeDescriptor::builder(id, "[System]System.Int32[]", TypeKind::Array)
                .with_element_type(int32)
                .build(),
        );
        let arr = heap.alloc_value_array(&array, 0, 4);
        assert_eq!(heap.allocations().size_of(arr), Some(16));
        heap.write_bytes(arr, TYPE_TAG_SIZE, &1_000_000i32.to_le_bytes()).unwrap();

        let view = ObjectView::load(&heap, arr).unwrap();
        match view.body(&heap) {
            Err(UldError::Truncated { needed, available, .. }) => {
                assert_eq!(needed, 1_000_012);
                assert_eq!(available, 16);
            }
            other => panic!("expected Truncated, got {other:?}"),
        }
    }

    #[test]
    fn test_value_array_count_within_allocation()
    {
        let mut heap = HeapImage::new();
        let id = heap.fresh_type_id();
        let int32 = heap.define_type(TypeDescriptor::builder(id, "[System]System.Int32", TypeKind::Struct).build());
        let id = heap.fresh_type_id();
        let array = heap.define_type(
            TypeDescriptor::builder(id, "[System]System.Int32[]", TypeKind::Array)
                .with_element_type(int32)
                .build(),
        );
        let arr = heap.alloc_value_array(&array, 3, 4);

        let view = ObjectView::load(&heap, arr).unwrap();
        assert!(matches!(view.body(&heap).unwrap(), ObjectBody::ValueArray { count: 3, .. }));
    }

    #[test]
    fn test_array_without_element_type()
    {
        let mut heap = HeapImage::new();
        let id = heap.fresh_type_id();
        let broken = heap.define_type(TypeDescriptor::builder(id, "[App]Broken[]", TypeKind::Array).build());
        let arr = heap.alloc_object(&broken, 4);

        let view = ObjectView::load(&heap, arr).unwrap();
        assert!(matches!(view.body(&heap), Err(UldError::MissingElementType(_))));
    }

    #[test]
    fn test_load_rejects_unallocated()
    {
        let heap = HeapImage::new();
        assert!(matches!(
            ObjectView::load(&heap, Address::new(0x1000)),
            Err(UldError::NotAnObject(_))
        ));
    }
}
