// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeSet;

use crate::errors::DiscoveryWarning;
use crate::registry::descriptor::ComponentDescriptor;
use crate::registry::scan;
use crate::registry::tags::{CATEGORY, MODALITY};

/// Outcome of looking a component name up in a snapshot.
#[derive(Debug, Clone)]
pub enum Resolution<'a> {
    Found(&'a ComponentDescriptor),
    Unknown,
    Ambiguous(Vec<String>),
}

/// Immutable result of one registry scan.
///
/// A run keeps using the snapshot it was validated against even if the host
/// re-scans in the meantime.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    descriptors: Vec<ComponentDescriptor>,
    warnings: Vec<DiscoveryWarning>,
}

impl RegistrySnapshot {
    pub(crate) fn new(descriptors: Vec<ComponentDescriptor>, warnings: Vec<DiscoveryWarning>) -> Self {
        Self {
            descriptors,
            warnings,
        }
    }

    /// Descriptors in scan order.
    pub fn descriptors(&self) -> &[ComponentDescriptor] {
        &self.descriptors
    }

    pub fn warnings(&self) -> &[DiscoveryWarning] {
        &self.warnings
    }

    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    pub fn get(&self, qualified_name: &str) -> Option<&ComponentDescriptor> {
        self.descriptors
            .iter()
            .find(|d| d.qualified_name == qualified_name)
    }

    /// Look up a qualified name, falling back to a short name when exactly one
    /// component carries it.
    pub fn resolve(&self, name: &str) -> Resolution<'_> {
        if let Some(descriptor) = self.get(name) {
            return Resolution::Found(descriptor);
        }

        let candidates: Vec<&ComponentDescriptor> = self
            .descriptors
            .iter()
            .filter(|d| d.short_name == name)
            .collect();

        match candidates.as_slice() {
            [] => Resolution::Unknown,
            [only] => Resolution::Found(only),
            many => Resolution::Ambiguous(
                many.iter().map(|d| d.qualified_name.clone()).collect(),
            ),
        }
    }

    pub fn filter(&self, modality: Option<&str>, category: Option<&str>) -> Vec<&ComponentDescriptor> {
        scan::filter(&self.descriptors, modality, category)
    }

    /// Every modality any component declares, sorted.
    pub fn all_modalities(&self) -> BTreeSet<&str> {
        self.axis_values(MODALITY)
    }

    /// Every category any component declares, sorted.
    pub fn all_categories(&self) -> BTreeSet<&str> {
        self.axis_values(CATEGORY)
    }

    fn axis_values(&self, axis: &str) -> BTreeSet<&str> {
        self.descriptors
            .iter()
            .flat_map(|d| d.tags.values(axis))
            .collect()
    }
}
