// Copyright (c) 2025 Nikolay Denev <ndenev@gmail.com>
// SPDX-License-Identifier: BSD-3-Clause

//! Fill a [`MemoryStore`] from manifest files
//!
//! Accepts YAML (one or more `---` separated documents) and JSON. `List`
//! documents are flattened into their `items`. Documents of other kinds
//! are skipped, so a single manifest bundle can feed several stores.

use anyhow::{Context, Result, anyhow};
use kube::Resource;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use std::path::Path;
use tracing::{debug, info, warn};

use super::store::MemoryStore;

/// Parse manifest text into individual object documents
///
/// Content starting with `{` or `[` is read as JSON, anything else as YAML.
pub fn parse_documents(content: &str) -> Result<Vec<Value>> {
    let trimmed = content.trim_start();
    let raw: Vec<Value> = if trimmed.starts_with('{') || trimmed.starts_with('[') {
        match serde_json::from_str(trimmed).context("Failed to parse JSON manifest")? {
            Value::Array(items) => items,
            doc => vec![doc],
        }
    } else {
        let mut docs = Vec::new();
        for (idx, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
            let doc = Value::deserialize(document)
                .with_context(|| format!("Failed to parse YAML document #{}", idx + 1))?;
            docs.push(doc);
        }
        docs
    };

    let mut documents = Vec::new();
    for doc in raw {
        flatten_into(doc, &mut documents);
    }
    Ok(documents)
}

fn flatten_into(doc: Value, out: &mut Vec<Value>) {
    match doc {
        Value::Null => {}
        Value::Object(mut map) => {
            let is_list = map
                .get("kind")
                .and_then(Value::as_str)
                .is_some_and(|kind| kind.ends_with("List"));
            let has_items = matches!(map.get("items"), Some(Value::Array(_)));
            if is_list
                && has_items
                && let Some(Value::Array(items)) = map.remove("items")
            {
                for item in items {
                    flatten_into(item, out);
                }
            } else {
                out.push(Value::Object(map));
            }
        }
        other => debug!("Skipping non-object manifest document: {}", other),
    }
}

/// Deserialize the documents whose apiVersion and kind match `K`
pub fn objects_of_kind<K>(documents: &[Value]) -> Result<Vec<K>>
where
    K: Resource + DeserializeOwned,
    K::DynamicType: Default,
{
    let dt = K::DynamicType::default();
    let kind = K::kind(&dt);
    let api_version = K::api_version(&dt);

    let mut objects = Vec::new();
    for doc in documents {
        let doc_kind = doc.get("kind").and_then(Value::as_str).unwrap_or_default();
        if doc_kind != kind {
            debug!("Skipping {} document while loading {}", doc_kind, kind);
            continue;
        }
        let doc_api_version = doc.get("apiVersion").and_then(Value::as_str).unwrap_or_default();
        if doc_api_version != api_version {
            warn!(
                "Skipping {} with apiVersion {} (expected {})",
                kind, doc_api_version, api_version
            );
            continue;
        }
        let obj = K::deserialize(doc)
            .with_context(|| format!("Failed to decode {} manifest", kind))?;
        objects.push(obj);
    }
    Ok(objects)
}

/// Load every object of kind `K` from a manifest file into the store
///
/// Returns the number of objects inserted.
pub fn load_file<K>(store: &MemoryStore<K>, path: &Path) -> Result<usize>
where
    K: Resource + DeserializeOwned,
    K::DynamicType: Default,
{
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read manifest file: {}", path.display()))?;
    let documents = parse_documents(&content)
        .with_context(|| format!("Failed to parse manifest file: {}", path.display()))?;
    let objects = objects_of_kind::<K>(&documents)?;

    let count = objects.len();
    for obj in objects {
        store
            .insert(obj)
            .map_err(|e| anyhow!("Failed to insert into store: {}", e))?;
    }
    info!("Loaded {} objects from {}", count, path.display());
    Ok(count)
}
