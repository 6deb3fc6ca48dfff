// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use crate::workflow::params::{ParamValue, Parameters};

/// One component invocation with bound parameters.
///
/// A step's index is its position in the owning workflow definition.
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessingStep {
    /// Qualified (or unambiguous short) component name.
    pub component: String,
    /// Component version the step was authored against, informational.
    pub version: Option<String>,
    pub label: Option<String>,
    pub parameters: Parameters,
}

impl ProcessingStep {
    pub fn new(component: impl Into<String>) -> Self {
        Self {
            component: component.into(),
            version: None,
            label: None,
            parameters: Parameters::new(),
        }
    }

    pub fn parameter(&self, name: &str) -> Option<&ParamValue> {
        self.parameters.get(name)
    }

    /// Label if set, otherwise the component name.
    pub fn display_name(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.component)
    }
}
