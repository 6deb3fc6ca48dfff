// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

mod loader;
pub mod consts;

pub use loader::{
    default_config_path, load_config, load_config_or_default, CoreConfig, LoadedConfig,
};
