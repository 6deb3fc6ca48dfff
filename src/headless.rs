// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Headless workflow execution: text document in, array file out.
//!
//! Flow: scan namespaces, compile the workflow document, validate it, execute
//! it, write the final array. Each failure kind maps to its own process exit
//! code so scripts can tell them apart.

use clap::Parser;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::array::ImageArray;
use crate::components::builtin_namespace;
use crate::config::{load_config, load_config_or_default, CoreConfig, LoadedConfig};
use crate::dispatch::{detect, Device, Dispatcher, GenericClassifier};
use crate::dsl::DslCompiler;
use crate::engine::{ExecutionInput, RunStatus, SequentialExecutor};
use crate::errors::{
    CompileError, ConfigError, ExecutionError, FailureClass, ParseError, ValidationErrors,
};
use crate::registry::{scan_shared, Namespace};
use crate::traits::{Accelerator, WorkflowRunner};

/// Run a workflow document against an image array stored as JSON.
#[derive(Parser, Debug, Clone)]
#[command(name = "grdk", version, about)]
pub struct HeadlessArgs {
    /// Workflow document (YAML)
    pub workflow: PathBuf,

    /// Input array as JSON: {"shape": [...], "data": [...]}
    #[arg(long)]
    pub input: PathBuf,

    /// Where to write the resulting array
    #[arg(long)]
    pub output: PathBuf,

    /// Reference array for coregistration steps
    #[arg(long)]
    pub reference: Option<PathBuf>,

    /// Never use an accelerator
    #[arg(long)]
    pub no_gpu: bool,

    /// Config file (defaults to ~/.grdk/grdk_config.yaml)
    #[arg(long)]
    pub config: Option<PathBuf>,
}

/// Process exit codes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Succeeded = 0,
    Usage = 1,
    Parse = 2,
    Validation = 3,
    Execution = 4,
    Cancelled = 5,
}

impl ExitStatus {
    pub fn code(self) -> i32 {
        self as i32
    }
}

#[derive(Error, Debug)]
pub enum HeadlessError {
    #[error("cannot access {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path} is not a valid image array: {source}")]
    InvalidArray {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Parse(ParseError),

    #[error(transparent)]
    Validation(ValidationErrors),

    #[error(transparent)]
    Execution(ExecutionError),

    #[error("cancelled after {completed} of {total} steps")]
    Cancelled { completed: usize, total: usize },
}

impl HeadlessError {
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            HeadlessError::Io { .. } | HeadlessError::InvalidArray { .. } => ExitStatus::Usage,
            HeadlessError::Parse(_) => ExitStatus::Parse,
            HeadlessError::Validation(_) => ExitStatus::Validation,
            HeadlessError::Execution(_) => ExitStatus::Execution,
            HeadlessError::Cancelled { .. } => ExitStatus::Cancelled,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            HeadlessError::Io { .. } | HeadlessError::InvalidArray { .. } => "io",
            HeadlessError::Parse(_) => "parse",
            HeadlessError::Validation(_) => "validation",
            HeadlessError::Execution(_) => "execution",
            HeadlessError::Cancelled { .. } => "cancelled",
        }
    }

    /// Step the failure is attributed to, where there is one.
    pub fn step_index(&self) -> Option<usize> {
        match self {
            HeadlessError::Parse(ParseError::MissingComponent { step_index }) => Some(*step_index),
            HeadlessError::Validation(errors) => errors.first_step(),
            HeadlessError::Execution(error) => Some(error.step_index),
            _ => None,
        }
    }
}

impl From<CompileError> for HeadlessError {
    fn from(error: CompileError) -> Self {
        match error {
            CompileError::Parse(error) => HeadlessError::Parse(error),
            CompileError::Validation(errors) => HeadlessError::Validation(errors),
        }
    }
}

/// Config for a headless run.
///
/// An explicit `--config` file must load. The default location may be absent
/// or unusable; defaults are used then, and the problem is kept for
/// [`LoadedConfig::warn_if_ignored`] once logging is up.
pub fn load_settings(args: &HeadlessArgs) -> Result<LoadedConfig, ConfigError> {
    match &args.config {
        Some(path) => Ok(LoadedConfig {
            config: load_config(path)?,
            path: Some(path.clone()),
            ignored: None,
        }),
        None => Ok(load_config_or_default(None)),
    }
}

/// Summary of a successful run.
#[derive(Debug, Clone)]
pub struct RunReport {
    pub workflow: String,
    pub devices: Vec<Device>,
    pub output: PathBuf,
}

/// Components and accelerators available to headless runs.
pub struct Headless {
    namespaces: Vec<Namespace>,
    accelerators: Vec<Arc<dyn Accelerator>>,
}

impl Default for Headless {
    fn default() -> Self {
        Self::new()
    }
}

impl Headless {
    /// Built-in components only, no accelerator.
    pub fn new() -> Self {
        Self {
            namespaces: vec![builtin_namespace()],
            accelerators: Vec::new(),
        }
    }

    pub fn namespace(mut self, namespace: Namespace) -> Self {
        self.namespaces.push(namespace);
        self
    }

    pub fn accelerator(mut self, accelerator: Arc<dyn Accelerator>) -> Self {
        self.accelerators.push(accelerator);
        self
    }

    pub async fn run(
        &self,
        args: &HeadlessArgs,
        config: &CoreConfig,
        cancellation: CancellationToken,
    ) -> Result<RunReport, HeadlessError> {
        let registry = scan_shared(&self.namespaces);

        let text = fs::read_to_string(&args.workflow).map_err(|source| HeadlessError::Io {
            path: args.workflow.clone(),
            source,
        })?;
        let mut workflow = DslCompiler::new(registry.clone()).compile_from_text(&text)?;
        workflow.validate(&registry).map_err(HeadlessError::Validation)?;

        let mut input = ExecutionInput::new(read_array(&args.input)?);
        if let Some(reference) = &args.reference {
            input = input.with_reference(read_array(reference)?);
        }

        let accelerator = detect(
            config.prefer_accelerator && !args.no_gpu,
            self.accelerators.iter().cloned(),
        );
        let executor = SequentialExecutor::new(
            Dispatcher::new(accelerator, Arc::new(GenericClassifier)),
            registry,
        )
        .with_max_concurrent_runs(config.max_concurrent_runs);

        let workflow = Arc::new(workflow);
        let context = executor
            .execute(workflow.clone(), input, None, cancellation)
            .await
            .map_err(HeadlessError::Validation)?;

        match context.status() {
            RunStatus::Succeeded => {
                write_array(&args.output, &context.final_output())?;
                Ok(RunReport {
                    workflow: workflow.name().to_string(),
                    devices: context.results().iter().map(|r| r.device).collect(),
                    output: args.output.clone(),
                })
            }
            RunStatus::Cancelled => Err(HeadlessError::Cancelled {
                completed: context.results().len(),
                total: workflow.step_count(),
            }),
            status => Err(HeadlessError::Execution(context.failure().cloned().unwrap_or_else(
                || ExecutionError {
                    step_index: context.current_step().unwrap_or(0),
                    component: workflow.name().to_string(),
                    class: FailureClass::Generic,
                    cause: format!("run ended in state {}", status),
                },
            ))),
        }
    }
}

fn read_array(path: &Path) -> Result<ImageArray, HeadlessError> {
    let text = fs::read_to_string(path).map_err(|source| HeadlessError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    serde_json::from_str(&text).map_err(|source| HeadlessError::InvalidArray {
        path: path.to_path_buf(),
        source,
    })
}

fn write_array(path: &Path, array: &ImageArray) -> Result<(), HeadlessError> {
    let io_error = |source: std::io::Error| HeadlessError::Io {
        path: path.to_path_buf(),
        source,
    };
    let text = serde_json::to_string(array).map_err(|e| io_error(e.into()))?;
    fs::write(path, text).map_err(io_error)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::MemoryLocation;
    use crate::errors::DispatchError;
    use tempfile::TempDir;

    struct AlwaysOnGpu;

    impl Accelerator for AlwaysOnGpu {
        fn name(&self) -> &str {
            "test-gpu"
        }

        fn is_available(&self) -> bool {
            true
        }

        fn to_device(&self, array: &ImageArray) -> Result<ImageArray, DispatchError> {
            Ok(array.clone().with_location(MemoryLocation::Accelerator))
        }

        fn to_host(&self, array: ImageArray) -> Result<ImageArray, DispatchError> {
            Ok(array.with_location(MemoryLocation::Host))
        }
    }

    struct Files {
        dir: TempDir,
    }

    impl Files {
        fn new(workflow: &str) -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("workflow.yaml"), workflow).unwrap();
            fs::write(
                dir.path().join("in.json"),
                r#"{"shape": [2, 2], "data": [0.0, 0.25, 0.5, 4.0]}"#,
            )
            .unwrap();
            Self { dir }
        }

        fn args(&self) -> HeadlessArgs {
            HeadlessArgs {
                workflow: self.dir.path().join("workflow.yaml"),
                input: self.dir.path().join("in.json"),
                output: self.dir.path().join("out.json"),
                reference: None,
                no_gpu: false,
                config: None,
            }
        }

        fn output(&self) -> ImageArray {
            let text = fs::read_to_string(self.dir.path().join("out.json")).unwrap();
            serde_json::from_str(&text).unwrap()
        }
    }

    const GAIN_AND_CLIP: &str = "name: gain-and-clip\nsteps:\n  - component: builtin.Scale\n    parameters:\n      factor: 2\n  - component: Clip\n";

    #[tokio::test]
    async fn test_successful_run_writes_output() {
        let files = Files::new(GAIN_AND_CLIP);

        let report = Headless::new()
            .run(&files.args(), &CoreConfig::default(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(report.workflow, "gain-and-clip");
        assert_eq!(report.devices, vec![Device::Cpu, Device::Cpu]);
        assert_eq!(files.output().data(), &[0.0, 0.5, 1.0, 1.0]);
    }

    #[tokio::test]
    async fn test_accelerator_flag_is_honored() {
        struct TestCase {
            name: &'static str,
            no_gpu: bool,
            prefer_accelerator: bool,
            expected: Device,
        }

        let test_cases = vec![
            TestCase { name: "preferred", no_gpu: false, prefer_accelerator: true, expected: Device::Accelerator },
            TestCase { name: "--no-gpu", no_gpu: true, prefer_accelerator: true, expected: Device::Cpu },
            TestCase { name: "config disables", no_gpu: false, prefer_accelerator: false, expected: Device::Cpu },
        ];

        for test_case in test_cases {
            let files = Files::new(GAIN_AND_CLIP);
            let mut args = files.args();
            args.no_gpu = test_case.no_gpu;
            let config = CoreConfig {
                prefer_accelerator: test_case.prefer_accelerator,
                ..CoreConfig::default()
            };

            let report = Headless::new()
                .accelerator(Arc::new(AlwaysOnGpu))
                .run(&args, &config, CancellationToken::new())
                .await
                .unwrap();

            assert_eq!(report.devices[0], test_case.expected, "Test case '{}'", test_case.name);
            assert_eq!(files.output().data(), &[0.0, 0.5, 1.0, 1.0], "Test case '{}'", test_case.name);
        }
    }

    #[tokio::test]
    async fn test_failures_map_to_distinct_exit_codes() {
        struct TestCase {
            name: &'static str,
            workflow: &'static str,
            cancelled: bool,
            expected: ExitStatus,
            step_index: Option<usize>,
        }

        let test_cases = vec![
            TestCase {
                name: "malformed document",
                workflow: "name: [broken",
                cancelled: false,
                expected: ExitStatus::Parse,
                step_index: None,
            },
            TestCase {
                name: "step without component",
                workflow: "name: w\nsteps:\n  - label: lost\n",
                cancelled: false,
                expected: ExitStatus::Parse,
                step_index: Some(0),
            },
            TestCase {
                name: "unknown component",
                workflow: "name: w\nsteps:\n  - component: Scale\n  - component: builtin.Sharpen\n",
                cancelled: false,
                expected: ExitStatus::Validation,
                step_index: Some(1),
            },
            TestCase {
                name: "constraint violation",
                workflow: "name: w\nsteps:\n  - component: Scale\n    parameters:\n      factor: -1\n",
                cancelled: false,
                expected: ExitStatus::Validation,
                step_index: Some(0),
            },
            TestCase {
                name: "coregistration without reference",
                workflow: "name: w\nsteps:\n  - component: CentroidShift\n",
                cancelled: false,
                expected: ExitStatus::Validation,
                step_index: Some(0),
            },
            TestCase {
                name: "component failure",
                workflow: "name: w\nsteps:\n  - component: Offset\n  - component: Clip\n    parameters:\n      low: 5\n      high: 1\n",
                cancelled: false,
                expected: ExitStatus::Execution,
                step_index: Some(1),
            },
            TestCase {
                name: "cancelled",
                workflow: GAIN_AND_CLIP,
                cancelled: true,
                expected: ExitStatus::Cancelled,
                step_index: None,
            },
        ];

        for test_case in test_cases {
            let files = Files::new(test_case.workflow);
            let token = CancellationToken::new();
            if test_case.cancelled {
                token.cancel();
            }

            let error = Headless::new()
                .run(&files.args(), &CoreConfig::default(), token)
                .await
                .unwrap_err();

            assert_eq!(error.exit_status(), test_case.expected, "Test case '{}'", test_case.name);
            assert_eq!(error.step_index(), test_case.step_index, "Test case '{}'", test_case.name);
            assert!(
                !files.dir.path().join("out.json").exists(),
                "Test case '{}' wrote output",
                test_case.name
            );
        }
    }

    #[tokio::test]
    async fn test_unreadable_input_is_a_usage_error() {
        let files = Files::new(GAIN_AND_CLIP);
        let mut args = files.args();
        args.input = files.dir.path().join("missing.json");

        let error = Headless::new()
            .run(&args, &CoreConfig::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error.exit_status(), ExitStatus::Usage);

        fs::write(files.dir.path().join("bad.json"), r#"{"shape": [3], "data": [1.0]}"#).unwrap();
        args.input = files.dir.path().join("bad.json");
        let error = Headless::new()
            .run(&args, &CoreConfig::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error.kind(), "io");

        fs::write(
            files.dir.path().join("huge.json"),
            r#"{"shape": [4294967296, 4294967296, 4294967296], "data": []}"#,
        )
        .unwrap();
        args.input = files.dir.path().join("huge.json");
        let error = Headless::new()
            .run(&args, &CoreConfig::default(), CancellationToken::new())
            .await
            .unwrap_err();
        assert_eq!(error.exit_status(), ExitStatus::Usage);
    }

    #[tokio::test]
    async fn test_reference_enables_coregistration() {
        let files = Files::new("name: w\nsteps:\n  - component: CentroidShift\n");
        fs::write(
            files.dir.path().join("ref.json"),
            r#"{"shape": [2, 2], "data": [1.0, 0.0, 0.0, 0.0]}"#,
        )
        .unwrap();
        let mut args = files.args();
        args.reference = Some(files.dir.path().join("ref.json"));

        Headless::new()
            .run(&args, &CoreConfig::default(), CancellationToken::new())
            .await
            .unwrap();

        assert_eq!(files.output().data(), &[0.0, 0.25, 0.5, 4.0]);
    }

    #[test]
    fn test_explicit_config_must_load() {
        let files = Files::new(GAIN_AND_CLIP);
        let mut args = files.args();

        fs::write(files.dir.path().join("good.yaml"), "max_concurrent_runs: 2\n").unwrap();
        args.config = Some(files.dir.path().join("good.yaml"));
        let loaded = load_settings(&args).unwrap();
        assert_eq!(loaded.config.max_concurrent_runs, 2);
        assert!(loaded.ignored.is_none());

        fs::write(files.dir.path().join("bad.yaml"), "max_concurrent_runs: many\n").unwrap();
        args.config = Some(files.dir.path().join("bad.yaml"));
        assert!(matches!(load_settings(&args), Err(ConfigError::Yaml(_))));

        args.config = Some(files.dir.path().join("absent.yaml"));
        assert!(matches!(load_settings(&args), Err(ConfigError::Io { .. })));
    }

    #[test]
    fn test_cli_arguments() {
        let args = HeadlessArgs::try_parse_from([
            "grdk", "w.yaml", "--input", "in.json", "--output", "out.json", "--no-gpu",
        ])
        .unwrap();
        assert!(args.no_gpu);
        assert_eq!(args.workflow, PathBuf::from("w.yaml"));

        assert!(HeadlessArgs::try_parse_from(["grdk", "w.yaml"]).is_err());
    }
}
