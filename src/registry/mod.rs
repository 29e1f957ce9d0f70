//! Directory-wide store of extracted records.
//!
//! Output definitions are keyed by exact class name and keep the position of
//! their first registration even when a later module overwrites them.

pub mod models;

pub use models::{Field, OutputDefinition, OutputReference, StandaloneFunction, UnitOfWork};

use std::collections::HashMap;

#[derive(Debug, Clone, Default)]
pub struct MetadataRegistry {
    units: Vec<UnitOfWork>,
    functions: Vec<StandaloneFunction>,
    outputs: Vec<OutputDefinition>,
    output_index: HashMap<String, usize>,
}

impl MetadataRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an output definition, replacing any previous one with the same name
    pub fn register_output_definition(&mut self, definition: OutputDefinition) {
        match self.output_index.get(&definition.name) {
            Some(&slot) => self.outputs[slot] = definition,
            None => {
                self.output_index
                    .insert(definition.name.clone(), self.outputs.len());
                self.outputs.push(definition);
            }
        }
    }

    pub fn register_unit_of_work(&mut self, unit: UnitOfWork) {
        if !unit.name.is_empty() && self.units.iter().any(|u| u.name == unit.name) {
            tracing::debug!("Duplicate unit-of-work id `{}`", unit.name);
        }
        self.units.push(unit);
    }

    pub fn register_function(&mut self, function: StandaloneFunction) {
        self.functions.push(function);
    }

    pub fn resolve_output(&self, name: &str) -> Option<&OutputDefinition> {
        self.output_index.get(name).map(|&slot| &self.outputs[slot])
    }

    /// Fields known for a reference; empty unless it resolves
    pub fn output_fields(&self, reference: &OutputReference) -> &[Field] {
        match reference {
            OutputReference::Resolved(name) => self
                .resolve_output(name)
                .map(|definition| definition.fields.as_slice())
                .unwrap_or(&[]),
            OutputReference::Unresolved(_) | OutputReference::Empty => &[],
        }
    }

    /// Orders units of work by case-insensitive title. The sort is stable so
    /// equal titles keep their registration order.
    pub fn finalize(&mut self) {
        self.units.sort_by_cached_key(|unit| unit.title.to_lowercase());
    }

    pub fn units(&self) -> &[UnitOfWork] {
        &self.units
    }

    pub fn functions(&self) -> &[StandaloneFunction] {
        &self.functions
    }

    /// Output definitions in first-registration order
    pub fn output_definitions(&self) -> &[OutputDefinition] {
        &self.outputs
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty() && self.functions.is_empty() && self.outputs.is_empty()
    }
}
