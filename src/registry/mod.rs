// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Component registry.
//!
//! Component libraries register their members into [`Namespace`]s. A
//! [`scan`] over an ordered list of namespaces turns every concrete processor
//! into an immutable [`ComponentDescriptor`] and collects them into a
//! [`RegistrySnapshot`], which the compiler, the workflow validator and the
//! executor share through an `Arc`.
//!
//! # Example
//!
//! ```rust
//! use grdk_core::registry::{scan, ComponentClass, Namespace};
//! use grdk_core::components::Scale;
//! use serde_json::json;
//!
//! let namespace = Namespace::new("filters").with(
//!     ComponentClass::transform("Scale", Scale)
//!         .tags(json!({"modalities": ["SAR"], "category": "contrast_enhancement"})),
//! );
//!
//! let snapshot = scan(&[namespace]);
//! assert_eq!(snapshot.filter(Some("SAR"), None).len(), 1);
//! assert!(snapshot.filter(Some("EO"), None).is_empty());
//! ```

pub mod descriptor;
pub mod namespace;
pub mod scan;
pub mod snapshot;
pub mod tags;


pub use descriptor::ComponentDescriptor;
pub use namespace::{ComponentClass, ComponentPlugin, Namespace};
pub use scan::{filter, scan, scan_shared};
pub use snapshot::{RegistrySnapshot, Resolution};
pub use tags::CapabilityTags;
