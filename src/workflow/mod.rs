// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! In-memory workflow model: steps, parameters, catalog tags, lifecycle state
//! and validation against a registry snapshot.

pub mod builder;
pub mod definition;
pub mod params;
pub mod step;
pub mod tags;
pub mod validation;

pub use builder::{step, StepBuilder, WorkflowBuilder};
pub use definition::{WorkflowDefinition, WorkflowState, DEFAULT_VERSION, RESERVED_KEYS};
pub use params::{ParamKind, ParamValue, ParameterSpec, Parameters};
pub use step::ProcessingStep;
pub use tags::{DetectionType, ImageModality, SegmentationType, WorkflowTags};
pub use validation::{coerce_parameters, resolve_parameters, resolve_steps, ResolvedStep};
