//! Process entry point: loads configuration, wires the domain ports to
//! their infrastructure adapters, and dispatches one request-surface
//! operation per invocation (spec.md §6), exiting with the documented
//! codes.

mod cli;

use clap::Parser;
use codesearch_application::Engine;
use codesearch_infrastructure::cache::LruQueryCache;
use codesearch_infrastructure::config::Config;
use codesearch_infrastructure::index::TantivyIndexService;
use codesearch_infrastructure::lock::FsLockManager;
use codesearch_infrastructure::logging;
use codesearch_infrastructure::path::PathResolver;
use codesearch_infrastructure::registry::JsonWorkspaceRegistry;
use anyhow::Context;
use std::process::ExitCode;
use std::sync::Arc;

const EXIT_OK: u8 = 0;
const EXIT_INVALID_ARGUMENTS: u8 = 2;
const EXIT_REGISTRY_REBUILT: u8 = 3;
const EXIT_INDEX_LOCKED: u8 = 4;
const EXIT_UNRECOVERABLE: u8 = 5;

#[tokio::main]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(error) => {
            // Process-boundary failures (bad config, an unrecoverable
            // registry) get the full anyhow cause chain; everything below
            // this boundary returns the typed `codesearch_domain::Error`.
            eprintln!("{error:#}");
            ExitCode::from(EXIT_UNRECOVERABLE)
        }
    }
}

async fn run() -> anyhow::Result<ExitCode> {
    let cli = cli::Cli::parse();

    let config = Config::load(cli.base_dir.clone()).context("failed to load configuration")?;
    let resolver = PathResolver::new(config.base_dir.clone());
    let _log_guard = logging::init(&resolver.logs_dir()).ok();

    let (registry, rebuilt) =
        JsonWorkspaceRegistry::recover_or_rebuild(resolver.clone()).context("workspace registry unrecoverable")?;
    if rebuilt {
        tracing::warn!("workspace registry was corrupt and has been rebuilt from a filesystem scan");
    }

    let engine = Engine::new(
        Arc::new(TantivyIndexService::with_ram_buffer(resolver.clone(), config.ram_buffer_mib)),
        Arc::new(registry),
        Arc::new(LruQueryCache::new(1024)),
        Arc::new(FsLockManager::new(resolver)),
    );

    let envelope = match cli::dispatch(&engine, cli.command).await {
        Ok(envelope) => envelope,
        Err(message) => {
            eprintln!("{message}");
            return Ok(ExitCode::from(EXIT_INVALID_ARGUMENTS));
        }
    };

    let success = envelope["success"].as_bool().unwrap_or(false);
    let error_code = envelope["error"]["code"].as_str().map(str::to_owned);
    println!("{}", serde_json::to_string_pretty(&envelope).unwrap_or_default());

    if success {
        return Ok(ExitCode::from(if rebuilt { EXIT_REGISTRY_REBUILT } else { EXIT_OK }));
    }
    Ok(match error_code.as_deref() {
        Some("IndexLocked") => ExitCode::from(EXIT_INDEX_LOCKED),
        _ if rebuilt => ExitCode::from(EXIT_REGISTRY_REBUILT),
        _ => ExitCode::from(EXIT_UNRECOVERABLE),
    })
}
