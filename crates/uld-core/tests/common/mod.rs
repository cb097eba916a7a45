//! Shared heap fixture for integration tests.

#![allow(dead_code)]

use std::io;

use uld_core::prelude::{
    Assembly, HeapImage, MemberKind, Runtime, Session, SessionOutcome, TypeDescriptor, TypeKind, TypeRef,
};

/// A small program's worth of types, split over a loaded and a read-only
/// assembly.
pub struct Fixture
{
    pub heap: HeapImage,
    pub int32: TypeRef,
    pub int_array: TypeRef,
    pub string_array: TypeRef,
    pub node: TypeRef,
    pub holder: TypeRef,
}

pub fn fixture() -> Fixture
{
    let mut heap = HeapImage::new();
    let string = heap.string_type().clone();

    let id = heap.fresh_type_id();
    let int32 = heap.define_type(TypeDescriptor::builder(id, "[System]System.Int32", TypeKind::Struct).build());

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
            .with_member("Visit", MemberKind::Method)
            .with_member("Visit", MemberKind::Method)
            .with_member("Count", MemberKind::Property)
            .build(),
    );

    let id = heap.fresh_type_id();
    let holder = heap.define_type(
        TypeDescriptor::builder(id, "[App]App.Holder`1", TypeKind::Class)
            .with_member("Instance", MemberKind::Field)
            .build(),
    );

    heap.add_assembly(
        Assembly::new("System")
            .with_type(string)
            .with_type(int32.clone())
            .with_type(int_array.clone())
            .with_type(string_array.clone()),
        true,
    );
    heap.add_assembly(
        Assembly::new("App").with_type(node.clone()).with_type(holder.clone()),
        false,
    );

    heap.push_frame("App.Program.Main()");
    heap.push_frame("App.Program.Walk(App.Node)");
    heap.push_frame("ULD.StaticDebug(StaticDebugInfo&)");

    Fixture {
        heap,
        int32,
        int_array,
        string_array,
        node,
        holder,
    }
}

/// Run one line through a fresh session.
///
/// Returns the outcome, then everything written to the output and error
/// streams.
pub fn exec(runtime: &dyn Runtime, line: &str) -> (Option<SessionOutcome>, String, String)
{
    let mut session = Session::new(runtime, io::empty(), Vec::new(), Vec::new());
    let outcome = session.execute(line).unwrap();
    let (_, out, err) = session.into_parts();
    (outcome, String::from_utf8(out).unwrap(), String::from_utf8(err).unwrap())
}
