use anyhow::{Context, Result};

pub struct YamlFormatter;

impl YamlFormatter {
    pub fn format(value: &serde_json::Value) -> Result<String> {
        serde_yaml::to_string(value).context("Failed to render YAML")
    }
}
