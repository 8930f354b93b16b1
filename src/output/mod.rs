// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

mod json;
mod table;
mod yaml;

pub use json::JsonFormatter;
pub use table::TableFormatter;
pub use yaml::YamlFormatter;

use anyhow::{Context, Result};
use kube::{Resource, ResourceExt};
use serde::Serialize;
use std::sync::Arc;

use crate::cli::OutputFormat;
use kube_lister::apis::certmanager::IssuerObject;

/// Tabular view of listed objects
#[derive(Debug, Clone)]
pub struct ResultSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl ResultSet {
    /// NAME, TYPE, READY and LABELS for each issuer
    pub fn from_issuers<K>(issuers: &[Arc<K>]) -> Self
    where
        K: Resource + IssuerObject,
    {
        let columns = ["NAME", "TYPE", "READY", "LABELS"]
            .iter()
            .map(|c| c.to_string())
            .collect();
        let rows = issuers
            .iter()
            .map(|issuer| {
                vec![
                    issuer.name_any(),
                    issuer.config().issuer_type().to_string(),
                    if issuer.is_ready() { "True" } else { "False" }.to_string(),
                    format_labels(issuer.as_ref()),
                ]
            })
            .collect();
        Self { columns, rows }
    }
}

/// `k1=v1,k2=v2`, or `<none>` when unlabeled
fn format_labels<K: Resource>(obj: &K) -> String {
    let labels = obj.labels();
    if labels.is_empty() {
        return "<none>".to_string();
    }
    labels
        .iter()
        .map(|(k, v)| format!("{}={}", k, v))
        .collect::<Vec<_>>()
        .join(",")
}

/// Render a list result in the requested format
///
/// JSON and YAML emit a `List` document holding the full objects.
pub fn render_list<K>(objects: &[Arc<K>], format: OutputFormat, no_headers: bool) -> Result<String>
where
    K: Resource + IssuerObject + Serialize,
{
    match format {
        OutputFormat::Table => Ok(TableFormatter::format(&ResultSet::from_issuers(objects), no_headers)),
        OutputFormat::Json | OutputFormat::Yaml => {
            let items = objects
                .iter()
                .map(|obj| serde_json::to_value(obj.as_ref()))
                .collect::<Result<Vec<_>, _>>()
                .context("Failed to serialize objects")?;
            let list = serde_json::json!({
                "apiVersion": "v1",
                "kind": "List",
                "items": items,
            });
            render_value(&list, format)
        }
    }
}

/// Render a single object in the requested format
pub fn render_one<K>(object: &Arc<K>, format: OutputFormat, no_headers: bool) -> Result<String>
where
    K: Resource + IssuerObject + Serialize,
{
    match format {
        OutputFormat::Table => render_list(std::slice::from_ref(object), format, no_headers),
        OutputFormat::Json | OutputFormat::Yaml => {
            let value = serde_json::to_value(object.as_ref()).context("Failed to serialize object")?;
            render_value(&value, format)
        }
    }
}

fn render_value(value: &serde_json::Value, format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Yaml => YamlFormatter::format(value),
        _ => JsonFormatter::format(value),
    }
}
