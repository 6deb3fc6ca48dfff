// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::registry::tags::CapabilityTags;
use crate::traits::EntryPoint;
use crate::workflow::ParameterSpec;

/// Immutable description of one discovered component.
#[derive(Debug, Clone)]
pub struct ComponentDescriptor {
    pub(crate) qualified_name: String,
    pub(crate) short_name: String,
    pub(crate) tags: CapabilityTags,
    pub(crate) description: String,
    pub(crate) gpu_compatible: bool,
    pub(crate) entry_point: EntryPoint,
    pub(crate) parameters: Vec<ParameterSpec>,
    pub(crate) version: Option<String>,
}

impl ComponentDescriptor {
    /// `<namespace>.<member>`, unique within a snapshot.
    pub fn qualified_name(&self) -> &str {
        &self.qualified_name
    }

    pub fn short_name(&self) -> &str {
        &self.short_name
    }

    pub fn tags(&self) -> &CapabilityTags {
        &self.tags
    }

    pub fn description(&self) -> &str {
        &self.description
    }

    pub fn gpu_compatible(&self) -> bool {
        self.gpu_compatible
    }

    pub fn entry_point(&self) -> &EntryPoint {
        &self.entry_point
    }

    /// `"apply"` or `"estimate"`.
    pub fn entry_point_name(&self) -> &'static str {
        self.entry_point.name()
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn parameter(&self, name: &str) -> Option<&ParameterSpec> {
        self.parameters.iter().find(|p| p.name == name)
    }

    pub fn version(&self) -> Option<&str> {
        self.version.as_deref()
    }
}
