// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod cli;
mod config;
mod output;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::debug;
use tracing_subscriber::prelude::*;

use cli::{Args, Command};
use kube_lister::apis::certmanager::ClusterIssuer;
use kube_lister::kubernetes::{MemoryStore, Selector, loader, new_cluster_issuer_lister};

/// Filter used when RUST_LOG is unset; warn keeps loader chatter off stderr
fn default_log_filter(verbose: bool) -> &'static str {
    if verbose { "kube_lister=debug" } else { "kube_lister=warn" }
}

/// Initialize logging to stderr, filtered by RUST_LOG when set
fn init_logging(verbose: bool) {
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(default_log_filter(verbose)));

    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(false);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(stderr_layer)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();
    init_logging(args.verbose);

    let mut config = config::Config::load().unwrap_or_else(|e| {
        eprintln!("Warning: Could not load config: {}", e);
        config::Config::default()
    });

    if let Command::Use { file } = &args.command {
        let path = file
            .canonicalize()
            .with_context(|| format!("Manifest file not found: {}", file.display()))?;
        config.set_manifests(path.clone())?;
        println!("Default manifest file set to {}", path.display());
        return Ok(());
    }

    let manifests = config.resolve_manifests(args.file.as_deref())?;
    let format = config.resolve_output(args.output);

    let store = Arc::new(MemoryStore::<ClusterIssuer>::new());
    let count = loader::load_file(&store, &manifests)?;
    debug!("Cache holds {} ClusterIssuers", count);

    let lister = new_cluster_issuer_lister(Arc::clone(&store));

    match &args.command {
        Command::List { selector } => {
            let selector = Selector::parse(selector)?;
            debug!("Listing ClusterIssuers matching {:?}", selector.to_string());
            let issuers = lister.list(&selector)?;
            println!("{}", output::render_list(&issuers, format, args.no_headers)?);
        }
        Command::Get { name } => match lister.get(name) {
            Ok(issuer) => println!("{}", output::render_one(&issuer, format, args.no_headers)?),
            Err(e) if e.is_not_found() => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
            Err(e) => return Err(e.into()),
        },
        Command::Use { .. } => {}
    }

    Ok(())
}
