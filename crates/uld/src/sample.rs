//! The heap image the reference host stops on.
//!
//! A small program's worth of state: a linked list of nodes, a few strings,
//! value and reference arrays, a generic static slot and a three-frame stack.

use uld_core::runtime::heap::HeapImage;
use uld_core::types::{Address, Assembly, MemberKind, TypeDescriptor, TypeKind};
use uld_core::UldResult;

/// Payload of an `App.Node`: an `Int32` value padded to 8 bytes, then `next`.
const NODE_PAYLOAD: usize = 16;
const NODE_NEXT_OFFSET: usize = 16;

/// Build the sample image.
///
/// ## Errors
///
/// Only if the image rejects one of its own writes.
pub fn build() -> UldResult<HeapImage>
{
    let mut heap = HeapImage::new();
    let string = heap.string_type().clone();

    let id = heap.fresh_type_id();
    let int32 = heap.define_type(
        TypeDescriptor::builder(id, "[System]System.Int32", TypeKind::Struct)
            .with_member("m_value", MemberKind::Field)
            .with_member("ToString", MemberKind::Method)
            .build(),
    );

    let id = heap.fresh_type_id();
    let int_array = heap.define_type(
        TypeDescriptor::builder(id, "[System]System.Int32[]", TypeKind::Array)
            .with_element_type(int32.clone())
            .build(),
    );

    let id = heap.fresh_type_id();
    let string_array = heap.define_type(
        TypeDescriptor::builder(id, "[System]System.String[]", TypeKind::Array)
            .with_element_type(string.clone())
            .build(),
    );

    let id = heap.fresh_type_id();
    let node = heap.define_type(
        TypeDescriptor::builder(id, "[App]App.Node", TypeKind::Class)
            .with_member("value", MemberKind::Field)
            .with_member("next", MemberKind::Field)
            .with_member(".ctor", MemberKind::Constructor)
            .with_member("Visit", MemberKind::Method)
            .with_member("Visit", MemberKind::Method)
            .with_member("Count", MemberKind::Property)
            .build(),
    );

    let id = heap.fresh_type_id();
    let cache = heap.define_type(
        TypeDescriptor::builder(id, "[App]App.Cache`1", TypeKind::Class)
            .with_member("Instance", MemberKind::Field)
            .with_member("Get", MemberKind::Method)
            .build(),
    );

    let id = heap.fresh_type_id();
    let program = heap.define_type(
        TypeDescriptor::builder(id, "[App]App.Program", TypeKind::Class)
            .with_member("Main", MemberKind::Method)
            .with_member("Walk", MemberKind::Method)
            .build(),
    );

    heap.add_assembly(
        Assembly::new("System")
            .with_type(string)
            .with_type(int32)
            .with_type(int_array.clone())
            .with_type(string_array.clone()),
        true,
    );
    heap.add_assembly(
        Assembly::new("App")
            .with_type(node.clone())
            .with_type(program)
            .with_type(cache.clone()),
        true,
    );
    heap.add_assembly(Assembly::new("App.Plugins"), false);

    let greeting = heap.alloc_string(b"Hello, \"world\"");
    let name = heap.alloc_string(b"uld");
    heap.alloc_ref_array(&string_array, &[greeting, name, Address::NULL]);
    heap.alloc_value_array(&int_array, 4, 4);

    // Build the list back to front so each node can point at its successor.
    let mut next = Address::NULL;
    for value in (1..=3i32).rev() {
        let current = heap.alloc_object(&node, NODE_PAYLOAD);
        heap.write_bytes(current, 8, &value.to_le_bytes())?;
        heap.write_bytes(current, NODE_NEXT_OFFSET, &next.value().to_le_bytes())?;
        next = current;
    }

    if let Some(instance) = cache.member("Instance").and_then(|group| group.first()) {
        heap.alloc_field_offset(&cache, instance.clone(), 8);
    }

    heap.push_frame("App.Program.Main(System.String[])");
    heap.push_frame("App.Program.Walk(App.Node)");
    heap.push_frame("ULD.StaticDebug(StaticDebugInfo&)");

    Ok(heap)
}
