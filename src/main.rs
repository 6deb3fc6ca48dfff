// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use clap::error::ErrorKind;
use clap::Parser;
use tokio_util::sync::CancellationToken;

use grdk_core::headless::{load_settings, ExitStatus, Headless, HeadlessArgs};
use grdk_core::observability::init_tracing;

#[tokio::main]
async fn main() {
    std::process::exit(run().await.code());
}

async fn run() -> ExitStatus {
    let args = match HeadlessArgs::try_parse() {
        Ok(args) => args,
        Err(e) => {
            // --help and --version land here too
            let _ = e.print();
            return match e.kind() {
                ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => ExitStatus::Succeeded,
                _ => ExitStatus::Usage,
            };
        }
    };

    let loaded = match load_settings(&args) {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("config error: {}", e);
            return ExitStatus::Usage;
        }
    };
    init_tracing(&loaded.config.log_filter);
    loaded.warn_if_ignored();
    let config = loaded.config;

    let cancellation = CancellationToken::new();
    let on_interrupt = cancellation.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, cancelling before the next step");
            on_interrupt.cancel();
        }
    });

    match Headless::new().run(&args, &config, cancellation).await {
        Ok(report) => {
            tracing::info!(
                workflow = %report.workflow,
                steps = report.devices.len(),
                output = %report.output.display(),
                "Workflow run succeeded"
            );
            ExitStatus::Succeeded
        }
        Err(e) => {
            match e.step_index() {
                Some(step) => eprintln!("{} error at step {}: {}", e.kind(), step, e),
                None => eprintln!("{} error: {}", e.kind(), e),
            }
            e.exit_status()
        }
    }
}
