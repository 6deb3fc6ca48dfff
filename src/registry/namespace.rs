// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Namespaces: the roots components register themselves into.

use serde_json::Value;

use crate::traits::{Coregistration, EntryPoint, Transform};
use crate::workflow::ParameterSpec;

/// One member of a namespace, as registered by its plugin.
///
/// Only concrete members with an entry point become component descriptors;
/// abstract bases and marker types can be registered for completeness and are
/// skipped by the scan.
#[derive(Debug, Clone)]
pub struct ComponentClass {
    pub name: String,
    pub entry_point: Option<EntryPoint>,
    pub is_abstract: bool,
    pub is_marker: bool,
    /// Raw capability tag declaration; `None` means untagged.
    pub declared_tags: Option<Value>,
    /// `None` means GPU-compatible.
    pub gpu_compatible: Option<bool>,
    pub parameters: Vec<ParameterSpec>,
    pub version: Option<String>,
}

impl ComponentClass {
    fn bare(name: impl Into<String>, entry_point: Option<EntryPoint>) -> Self {
        Self {
            name: name.into(),
            entry_point,
            is_abstract: false,
            is_marker: false,
            declared_tags: None,
            gpu_compatible: None,
            parameters: Vec::new(),
            version: None,
        }
    }

    pub fn transform<T: Transform + 'static>(name: impl Into<String>, transform: T) -> Self {
        Self::bare(name, Some(EntryPoint::transform(transform)))
    }

    pub fn coregistration<C: Coregistration + 'static>(
        name: impl Into<String>,
        coregistration: C,
    ) -> Self {
        Self::bare(name, Some(EntryPoint::coregistration(coregistration)))
    }

    /// A member without any entry point, e.g. a helper type.
    pub fn plain(name: impl Into<String>) -> Self {
        Self::bare(name, None)
    }

    pub fn abstract_base(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn marker(mut self) -> Self {
        self.is_marker = true;
        self
    }

    pub fn tags(mut self, declared: Value) -> Self {
        self.declared_tags = Some(declared);
        self
    }

    pub fn gpu_compatible(mut self, compatible: bool) -> Self {
        self.gpu_compatible = Some(compatible);
        self
    }

    pub fn parameter(mut self, spec: ParameterSpec) -> Self {
        self.parameters.push(spec);
        self
    }

    pub fn version(mut self, version: impl Into<String>) -> Self {
        self.version = Some(version.into());
        self
    }
}

/// Implemented by component libraries that contribute members to a namespace.
pub trait ComponentPlugin {
    fn register(namespace: &mut Namespace);
}

/// A named root holding registered members in registration order.
#[derive(Debug, Clone)]
pub struct Namespace {
    name: String,
    members: Vec<ComponentClass>,
}

impl Namespace {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn members(&self) -> &[ComponentClass] {
        &self.members
    }

    pub fn register(&mut self, member: ComponentClass) -> &mut Self {
        self.members.push(member);
        self
    }

    pub fn with(mut self, member: ComponentClass) -> Self {
        self.members.push(member);
        self
    }

    /// Let a plugin register its members.
    pub fn install<P: ComponentPlugin>(&mut self) -> &mut Self {
        P::register(self);
        self
    }
}
