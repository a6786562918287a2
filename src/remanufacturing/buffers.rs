use super::config::LineParameters;
use super::entities::{Component, ComponentType, Core, Product};
use crate::core::simulation_engine::SimulationEngine;
use crate::core::store::Store;
use crate::error::Result;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// The eleven buffers of the line, in flow order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BufferKind {
    Arrival,
    Cleaned,
    DiscardedCores,
    Components,
    CleanedComponents,
    GoodQualityComponents,
    ToBeRepairedComponents,
    DiscardedComponents,
    FinishedProducts,
    InspectedFinishedProducts,
    DiscardedProducts,
}

impl BufferKind {
    pub const ALL: [BufferKind; 11] = [
        BufferKind::Arrival,
        BufferKind::Cleaned,
        BufferKind::DiscardedCores,
        BufferKind::Components,
        BufferKind::CleanedComponents,
        BufferKind::GoodQualityComponents,
        BufferKind::ToBeRepairedComponents,
        BufferKind::DiscardedComponents,
        BufferKind::FinishedProducts,
        BufferKind::InspectedFinishedProducts,
        BufferKind::DiscardedProducts,
    ];

    /// Buffers holding components, which can be broken down by type
    pub const COMPONENT_BUFFERS: [BufferKind; 5] = [
        BufferKind::Components,
        BufferKind::CleanedComponents,
        BufferKind::GoodQualityComponents,
        BufferKind::ToBeRepairedComponents,
        BufferKind::DiscardedComponents,
    ];

    /// Terminal buffers that are never drained
    pub const SINKS: [BufferKind; 3] = [
        BufferKind::DiscardedCores,
        BufferKind::DiscardedComponents,
        BufferKind::DiscardedProducts,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            BufferKind::Arrival => "arrival_buffer",
            BufferKind::Cleaned => "cleaned_buffer",
            BufferKind::DiscardedCores => "discarded_cores_buffer",
            BufferKind::Components => "components_buffer",
            BufferKind::CleanedComponents => "cleaned_components_buffer",
            BufferKind::GoodQualityComponents => "good_quality_components_buffer",
            BufferKind::ToBeRepairedComponents => "to_be_repaired_components_buffer",
            BufferKind::DiscardedComponents => "discarded_components_buffer",
            BufferKind::FinishedProducts => "finished_products_buffer",
            BufferKind::InspectedFinishedProducts => "inspected_finished_products_buffer",
            BufferKind::DiscardedProducts => "discarded_products_buffer",
        }
    }
}

impl fmt::Display for BufferKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Handles to every buffer of the line. Clones share the same buffers.
#[derive(Clone)]
pub struct LineBuffers {
    pub arrival: Store<Core>,
    pub cleaned: Store<Core>,
    pub discarded_cores: Store<Core>,
    pub components: Store<Component>,
    pub cleaned_components: Store<Component>,
    pub good_quality_components: Store<Component>,
    pub to_be_repaired_components: Store<Component>,
    pub discarded_components: Store<Component>,
    pub finished_products: Store<Product>,
    pub inspected_finished_products: Store<Product>,
    pub discarded_products: Store<Product>,
}

impl LineBuffers {
    pub fn new<W>(engine: &SimulationEngine<W>, params: &LineParameters) -> Result<Self> {
        let capacity = |kind: BufferKind| params.buffer_capacity(kind);
        Ok(Self {
            arrival: engine.create_store(BufferKind::Arrival.name(), capacity(BufferKind::Arrival)?),
            cleaned: engine.create_store(BufferKind::Cleaned.name(), capacity(BufferKind::Cleaned)?),
            discarded_cores: engine.create_store(
                BufferKind::DiscardedCores.name(),
                capacity(BufferKind::DiscardedCores)?,
            ),
            components: engine.create_store(BufferKind::Components.name(), capacity(BufferKind::Components)?),
            cleaned_components: engine.create_store(
                BufferKind::CleanedComponents.name(),
                capacity(BufferKind::CleanedComponents)?,
            ),
            good_quality_components: engine.create_store(
                BufferKind::GoodQualityComponents.name(),
                capacity(BufferKind::GoodQualityComponents)?,
            ),
            to_be_repaired_components: engine.create_store(
                BufferKind::ToBeRepairedComponents.name(),
                capacity(BufferKind::ToBeRepairedComponents)?,
            ),
            discarded_components: engine.create_store(
                BufferKind::DiscardedComponents.name(),
                capacity(BufferKind::DiscardedComponents)?,
            ),
            finished_products: engine.create_store(
                BufferKind::FinishedProducts.name(),
                capacity(BufferKind::FinishedProducts)?,
            ),
            inspected_finished_products: engine.create_store(
                BufferKind::InspectedFinishedProducts.name(),
                capacity(BufferKind::InspectedFinishedProducts)?,
            ),
            discarded_products: engine.create_store(
                BufferKind::DiscardedProducts.name(),
                capacity(BufferKind::DiscardedProducts)?,
            ),
        })
    }

    fn component_store(&self, kind: BufferKind) -> Option<&Store<Component>> {
        match kind {
            BufferKind::Components => Some(&self.components),
            BufferKind::CleanedComponents => Some(&self.cleaned_components),
            BufferKind::GoodQualityComponents => Some(&self.good_quality_components),
            BufferKind::ToBeRepairedComponents => Some(&self.to_be_repaired_components),
            BufferKind::DiscardedComponents => Some(&self.discarded_components),
            _ => None,
        }
    }

    pub fn level(&self, kind: BufferKind) -> usize {
        match kind {
            BufferKind::Arrival => self.arrival.len(),
            BufferKind::Cleaned => self.cleaned.len(),
            BufferKind::DiscardedCores => self.discarded_cores.len(),
            BufferKind::FinishedProducts => self.finished_products.len(),
            BufferKind::InspectedFinishedProducts => self.inspected_finished_products.len(),
            BufferKind::DiscardedProducts => self.discarded_products.len(),
            _ => self.component_store(kind).map_or(0, |store| store.len()),
        }
    }

    pub fn levels(&self) -> BTreeMap<BufferKind, usize> {
        BufferKind::ALL.into_iter().map(|kind| (kind, self.level(kind))).collect()
    }

    /// Per-type counts of a component buffer, with zero entries for absent
    /// types. `None` for buffers that do not hold components.
    pub fn composition(&self, kind: BufferKind) -> Option<BTreeMap<ComponentType, usize>> {
        let store = self.component_store(kind)?;
        let empty: BTreeMap<ComponentType, usize> = ComponentType::ALL.into_iter().map(|t| (t, 0)).collect();
        Some(store.fold(empty, |mut counts, component| {
            *counts.entry(component.component_type).or_insert(0) += 1;
            counts
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::types::ProcessId;

    #[test]
    fn test_buffers_use_configured_capacities() {
        let engine = SimulationEngine::new(());
        let mut params = LineParameters::default();
        params.buffer_capacities.insert(BufferKind::Cleaned, 7);
        let buffers = LineBuffers::new(&engine, &params).unwrap();

        assert_eq!(buffers.cleaned.capacity(), 7);
        assert_eq!(buffers.arrival.capacity(), 500);
        assert_eq!(buffers.discarded_products.name(), "discarded_products_buffer");
    }

    #[test]
    fn test_missing_capacity_is_an_error() {
        let engine = SimulationEngine::new(());
        let mut params = LineParameters::default();
        params.buffer_capacities.remove(&BufferKind::Components);
        assert!(LineBuffers::new(&engine, &params).is_err());
    }

    #[test]
    fn test_levels_and_composition() {
        let engine = SimulationEngine::new(());
        let buffers = LineBuffers::new(&engine, &LineParameters::default()).unwrap();
        let pid = ProcessId(0);
        buffers.good_quality_components.put(pid, Component::purchased(ComponentType::B));
        buffers.good_quality_components.put(pid, Component::purchased(ComponentType::B));
        buffers.good_quality_components.put(pid, Component::purchased(ComponentType::A));
        buffers.arrival.put(pid, Core::new());

        let levels = buffers.levels();
        assert_eq!(levels.len(), 11);
        assert_eq!(levels[&BufferKind::GoodQualityComponents], 3);
        assert_eq!(levels[&BufferKind::Arrival], 1);

        let composition = buffers.composition(BufferKind::GoodQualityComponents).unwrap();
        assert_eq!(composition[&ComponentType::A], 1);
        assert_eq!(composition[&ComponentType::B], 2);
        assert_eq!(composition[&ComponentType::C], 0);
        assert!(buffers.composition(BufferKind::Arrival).is_none());
    }
}
