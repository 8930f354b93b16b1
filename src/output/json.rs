use anyhow::{Context, Result};

pub struct JsonFormatter;

impl JsonFormatter {
    pub fn format(value: &serde_json::Value) -> Result<String> {
        serde_json::to_string_pretty(value).context("Failed to render JSON")
    }
}
