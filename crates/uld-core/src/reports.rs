//! # Registry Reports
//!
//! Read-only listings of the allocation table and the assembly catalog.
//!
//! Each report writes its lines to the supplied writer and returns the
//! tallies it printed, so callers (and tests) can check them without parsing
//! text. Entries appear in the registries' own order: allocations by address,
//! assemblies and types by name.

use std::collections::BTreeMap;
use std::io::Write;

use tracing::debug;

use crate::error::UldResult;
use crate::runtime::Runtime;
use crate::types::TypeId;

/// Label for allocations whose tag names no known type.
const UNKNOWN_TYPE: &str = "<unknown>";

/// Prefix for entries present in the read catalog only.
const NOT_LOADED: &str = "(not fully loaded) ";

/// Bytes attributed to one dynamic type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TypeUsage
{
    /// Display name, or `<unknown>`.
    pub name: String,
    /// Sum of allocation sizes.
    pub bytes: usize,
}

/// What the allocation report printed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AllocationSummary
{
    /// Number of live objects.
    pub objects: usize,
    /// The table's running total.
    pub total_bytes: usize,
    /// Per-type breakdown, ordered by type id (unknown types last).
    pub per_type: Vec<TypeUsage>,
    /// Number of field-offset allocations listed.
    pub field_offsets: usize,
}

/// Loaded vs. read-only counts of a catalog report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CatalogTally
{
    /// Entries only in the read catalog.
    pub read_only: usize,
    /// Entries also in the loaded catalog.
    pub loaded: usize,
}

impl CatalogTally
{
    /// Every entry, classified either way.
    pub const fn total(&self) -> usize
    {
        self.read_only + self.loaded
    }

    fn count(&mut self, loaded: bool)
    {
        if loaded {
            self.loaded += 1;
        } else {
            self.read_only += 1;
        }
    }
}

/// Report generator bound to one runtime.
#[derive(Clone, Copy)]
pub struct Reports<'rt>
{
    runtime: &'rt dyn Runtime,
}

impl<'rt> Reports<'rt>
{
    /// Create reports over `runtime`.
    pub fn new(runtime: &'rt dyn Runtime) -> Self
    {
        Self { runtime }
    }

    /// Every live object with its type and size, a per-type breakdown, the
    /// totals, and the field-offset allocations.
    ///
    /// ## Errors
    ///
    /// Only write failures on `out`.
    pub fn allocations(&self, out: &mut dyn Write) -> UldResult<AllocationSummary>
    {
        let table = self.runtime.allocations();
        let mut per_type: BTreeMap<Option<TypeId>, TypeUsage> = BTreeMap::new();

        for (&address, &size) in table.iter() {
            let ty = self.runtime.type_of(address);
            let name = ty
                .as_ref()
                .map_or_else(|| UNKNOWN_TYPE.to_string(), |ty| self.runtime.display_name(ty));
            writeln!(out, "{name} @ {address} ({size} bytes)")?;

            let key = ty.map(|ty| ty.id());
            per_type
                .entry(key)
                .or_insert_with(|| TypeUsage { name, bytes: 0 })
                .bytes += size;
        }

        writeln!(out)?;
        writeln!(out, "Per-Type Breakdown:")?;
        // `None` sorts first; list unknown types last instead.
        let unknown = per_type.remove(&None);
        let per_type: Vec<TypeUsage> = per_type.into_values().chain(unknown).collect();
        for usage in &per_type {
            writeln!(out, "{}: {} bytes", usage.name, usage.bytes)?;
        }

        writeln!(
            out,
            "{} objects, {} bytes allocated total.",
            table.len(),
            table.total_size()
        )?;
        writeln!(out)?;

        let mut field_offsets = 0;
        for &address in table.field_offsets() {
            let member = self
                .runtime
                .resolve_member(address)
                .map_or_else(|| UNKNOWN_TYPE.to_string(), |member| self.runtime.member_display_name(&member));
            writeln!(
                out,
                "{address} also allocated as a runtime generic static field offset for {member}"
            )?;
            field_offsets += 1;
        }

        debug!(objects = table.len(), bytes = table.total_size(), "allocation report");
        Ok(AllocationSummary {
            objects: table.len(),
            total_bytes: table.total_size(),
            per_type,
            field_offsets,
        })
    }

    /// Every read assembly with its type count and load state.
    ///
    /// ## Errors
    ///
    /// Only write failures on `out`.
    pub fn assemblies(&self, out: &mut dyn Write) -> UldResult<CatalogTally>
    {
        let catalog = self.runtime.assemblies();
        let mut tally = CatalogTally::default();

        for (name, assembly) in catalog.read() {
            let loaded = catalog.is_loaded(name);
            let prefix = if loaded { "" } else { NOT_LOADED };
            writeln!(out, "{prefix}{name} ({} types)", assembly.type_count())?;
            tally.count(loaded);
        }

        write_tally(out, tally)?;
        Ok(tally)
    }

    /// Every type of every read assembly, classified by its assembly's load
    /// state.
    ///
    /// ## Errors
    ///
    /// Only write failures on `out`.
    pub fn types(&self, out: &mut dyn Write) -> UldResult<CatalogTally>
    {
        let catalog = self.runtime.assemblies();
        let mut tally = CatalogTally::default();

        for (assembly_name, assembly) in catalog.read() {
            let loaded = catalog.is_loaded(assembly_name);
            let prefix = if loaded { "" } else { NOT_LOADED };
            for (_, ty) in assembly.types() {
                writeln!(out, "{prefix}{} ({assembly_name})", self.runtime.display_name(ty))?;
                tally.count(loaded);
            }
        }

        write_tally(out, tally)?;
        Ok(tally)
    }
}

fn write_tally(out: &mut dyn Write, tally: CatalogTally) -> UldResult<()>
{
    writeln!(
        out,
        "{} read, {} loaded, {} total.",
        tally.read_only,
        tally.loaded,
        tally.total()
    )?;
    Ok(())
}
