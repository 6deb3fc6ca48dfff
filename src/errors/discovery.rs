// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use thiserror::Error;

/// A namespace member that could not be turned into a component descriptor.
///
/// Recorded on the registry snapshot and logged; never aborts a scan.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DiscoveryWarning {
    #[error("component '{qualified_name}' skipped: malformed capability tags ({reason})")]
    MalformedTags {
        qualified_name: String,
        reason: String,
    },

    #[error("component '{qualified_name}' skipped: qualified name already registered")]
    DuplicateName { qualified_name: String },
}

impl DiscoveryWarning {
    pub fn qualified_name(&self) -> &str {
        match self {
            DiscoveryWarning::MalformedTags { qualified_name, .. }
            | DiscoveryWarning::DuplicateName { qualified_name } => qualified_name,
        }
    }
}
