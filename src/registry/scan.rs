// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashSet;
use std::sync::Arc;

use crate::errors::DiscoveryWarning;
use crate::observability::messages::registry::{ComponentSkipped, ScanCompleted, ScanStarted};
use crate::observability::messages::StructuredLog;
use crate::registry::descriptor::ComponentDescriptor;
use crate::registry::namespace::{ComponentClass, Namespace};
use crate::registry::snapshot::RegistrySnapshot;
use crate::registry::tags::{CapabilityTags, CATEGORY, MODALITY};
use crate::traits::EntryPoint;

/// Build a registry snapshot from `namespaces`.
///
/// Namespaces are visited in the order given and members within each in
/// lexical name order, so an unchanged namespace set always yields the same
/// descriptor sequence. Members that are not processors are ignored; members
/// that cannot be described are skipped with a [`DiscoveryWarning`].
pub fn scan(namespaces: &[Namespace]) -> RegistrySnapshot {
    let names: Vec<&str> = namespaces.iter().map(Namespace::name).collect();
    let started = ScanStarted { namespaces: &names };
    let _span = started.span("scan").entered();
    started.log();

    let mut descriptors = Vec::new();
    let mut warnings = Vec::new();
    let mut seen: HashSet<String> = HashSet::new();

    for namespace in namespaces {
        let mut members: Vec<(&ComponentClass, &EntryPoint)> = namespace
            .members()
            .iter()
            .filter(|member| !member.is_abstract && !member.is_marker)
            .filter_map(|member| member.entry_point.as_ref().map(|entry| (member, entry)))
            .collect();
        members.sort_by(|(a, _), (b, _)| a.name.cmp(&b.name));

        for (member, entry_point) in members {
            match describe(namespace.name(), member, entry_point) {
                Ok(descriptor) => {
                    if seen.insert(descriptor.qualified_name.clone()) {
                        descriptors.push(descriptor);
                    } else {
                        record(
                            &mut warnings,
                            DiscoveryWarning::DuplicateName {
                                qualified_name: descriptor.qualified_name,
                            },
                        );
                    }
                }
                Err(warning) => record(&mut warnings, warning),
            }
        }
    }

    ScanCompleted {
        namespace_count: namespaces.len(),
        component_count: descriptors.len(),
        warning_count: warnings.len(),
    }
    .log();

    RegistrySnapshot::new(descriptors, warnings)
}

/// [`scan`], wrapped for sharing between compilers and executors.
pub fn scan_shared(namespaces: &[Namespace]) -> Arc<RegistrySnapshot> {
    Arc::new(scan(namespaces))
}

/// Keep descriptors matching every supplied filter value.
///
/// A descriptor with no tags on an axis matches any value for that axis.
pub fn filter<'a, I>(
    descriptors: I,
    modality: Option<&str>,
    category: Option<&str>,
) -> Vec<&'a ComponentDescriptor>
where
    I: IntoIterator<Item = &'a ComponentDescriptor>,
{
    descriptors
        .into_iter()
        .filter(|d| modality.map_or(true, |m| d.tags.matches(MODALITY, m)))
        .filter(|d| category.map_or(true, |c| d.tags.matches(CATEGORY, c)))
        .collect()
}

fn describe(
    namespace: &str,
    member: &ComponentClass,
    entry_point: &EntryPoint,
) -> Result<ComponentDescriptor, DiscoveryWarning> {
    let qualified_name = format!("{}.{}", namespace, member.name);

    let (tags, description) = match &member.declared_tags {
        None => (CapabilityTags::default(), None),
        Some(declared) => CapabilityTags::from_declared(declared).map_err(|reason| {
            DiscoveryWarning::MalformedTags {
                qualified_name: qualified_name.clone(),
                reason,
            }
        })?,
    };

    Ok(ComponentDescriptor {
        qualified_name,
        short_name: member.name.clone(),
        tags,
        description: description.unwrap_or_default(),
        gpu_compatible: member.gpu_compatible.unwrap_or(true),
        entry_point: entry_point.clone(),
        parameters: member.parameters.clone(),
        version: member.version.clone(),
    })
}

fn record(warnings: &mut Vec<DiscoveryWarning>, warning: DiscoveryWarning) {
    ComponentSkipped { warning: &warning }.log();
    warnings.push(warning);
}
