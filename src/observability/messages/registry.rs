// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for component discovery.

use crate::errors::DiscoveryWarning;
use crate::observability::messages::StructuredLog;
use std::fmt::{Display, Formatter};
use tracing::Span;

/// Registry scan started.
///
/// # Log Level
/// `debug!`
pub struct ScanStarted<'a> {
    pub namespaces: &'a [&'a str],
}

impl Display for ScanStarted<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "Scanning namespaces: {}", self.namespaces.join(", "))
    }
}

impl StructuredLog for ScanStarted<'_> {
    fn log(&self) {
        tracing::debug!(
            namespace_count = self.namespaces.len(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "registry_scan",
            span_name = name,
            namespace_count = self.namespaces.len(),
        )
    }
}

/// Registry scan produced a snapshot.
///
/// # Log Level
/// `info!`
pub struct ScanCompleted {
    pub namespace_count: usize,
    pub component_count: usize,
    pub warning_count: usize,
}

impl Display for ScanCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "Discovered {} components across {} namespaces ({} skipped)",
            self.component_count, self.namespace_count, self.warning_count
        )
    }
}

impl StructuredLog for ScanCompleted {
    fn log(&self) {
        tracing::info!(
            namespace_count = self.namespace_count,
            component_count = self.component_count,
            warning_count = self.warning_count,
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "registry_scan_completed",
            span_name = name,
            component_count = self.component_count,
        )
    }
}

/// A member was skipped during the scan.
///
/// # Log Level
/// `warn!` - degraded palette, scan continues
pub struct ComponentSkipped<'a> {
    pub warning: &'a DiscoveryWarning,
}

impl Display for ComponentSkipped<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.warning)
    }
}

impl StructuredLog for ComponentSkipped<'_> {
    fn log(&self) {
        tracing::warn!(
            component = self.warning.qualified_name(),
            "{}", self
        );
    }

    fn span(&self, name: &str) -> Span {
        tracing::warn_span!(
            "component_skipped",
            span_name = name,
            component = self.warning.qualified_name(),
        )
    }
}
