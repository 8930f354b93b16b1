// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

use clap::{Parser, Subcommand, ValueEnum};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(name = "kube-lister")]
#[command(author, version, about = "List and get cert-manager ClusterIssuers from a local cache")]
pub struct Args {
    #[command(subcommand)]
    pub command: Command,

    /// Manifest file (YAML or JSON) the cache is loaded from
    #[arg(short, long, global = true, value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(short, long, global = true, value_enum)]
    pub output: Option<OutputFormat>,

    /// Omit column headers in output
    #[arg(long, global = true)]
    pub no_headers: bool,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List ClusterIssuers matching a label selector
    List {
        /// Label selector, e.g. "env=prod,tier in (web,api)"
        #[arg(short = 'l', long = "selector", default_value = "")]
        selector: String,
    },

    /// Get a single ClusterIssuer by name
    Get {
        /// ClusterIssuer name
        name: String,
    },

    /// Remember a manifest file as the default for later commands
    Use {
        /// Manifest file (YAML or JSON)
        file: PathBuf,
    },
}

#[derive(ValueEnum, Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Table,
    Json,
    Yaml,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_list_with_selector() {
        let args = Args::parse_from(["kube-lister", "list", "-l", "env=prod", "-o", "json"]);
        match args.command {
            Command::List { selector } => assert_eq!(selector, "env=prod"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.output, Some(OutputFormat::Json));
    }

    #[test]
    fn test_parse_list_defaults_to_everything() {
        let args = Args::parse_from(["kube-lister", "list"]);
        match args.command {
            Command::List { selector } => assert!(selector.is_empty()),
            other => panic!("unexpected command: {:?}", other),
        }
        assert!(args.output.is_none());
        assert!(!args.no_headers);
    }

    #[test]
    fn test_parse_get_with_global_file() {
        let args = Args::parse_from(["kube-lister", "get", "letsencrypt", "--file", "issuers.yaml"]);
        match args.command {
            Command::Get { name } => assert_eq!(name, "letsencrypt"),
            other => panic!("unexpected command: {:?}", other),
        }
        assert_eq!(args.file, Some(PathBuf::from("issuers.yaml")));
    }

    #[test]
    fn test_missing_subcommand_is_error() {
        assert!(Args::try_parse_from(["kube-lister"]).is_err());
    }
}
