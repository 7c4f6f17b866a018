use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use renoquote_core::config::{resolve_config_path, LoadOptions};
use toml::Value;

use crate::bootstrap::load_config;
use crate::commands::CommandResult;

pub fn run(options: &LoadOptions) -> CommandResult {
    let config = match load_config(options) {
        Ok(config) => config,
        Err(error) => return CommandResult::from_error("config", &error),
    };

    let config_file_path = resolve_config_path(options.config_path.as_deref());
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let source = |key_path: &str, env_keys: &[&str]| {
        field_source(key_path, env_keys, config_file_doc.as_ref(), config_file_path.as_deref())
    };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    let reference_tables = config
        .pricing
        .reference_tables
        .as_deref()
        .map(|path| path.display().to_string())
        .unwrap_or_else(|| "<builtin>".to_string());
    lines.push(render_line(
        "pricing.reference_tables",
        &reference_tables,
        source("pricing.reference_tables", &["RENOQUOTE_PRICING_REFERENCE_TABLES"]),
    ));
    lines.push(render_line(
        "pricing.vat_country",
        config.pricing.vat_country.as_str(),
        source("pricing.vat_country", &["RENOQUOTE_PRICING_VAT_COUNTRY"]),
    ));
    lines.push(render_line(
        "pricing.base_margin",
        &config.pricing.base_margin.to_string(),
        source("pricing.base_margin", &["RENOQUOTE_PRICING_BASE_MARGIN"]),
    ));

    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        source("logging.level", &["RENOQUOTE_LOGGING_LEVEL", "RENOQUOTE_LOG_LEVEL"]),
    ));
    lines.push(render_line(
        "logging.format",
        config.logging.format.as_str(),
        source("logging.format", &["RENOQUOTE_LOGGING_FORMAT", "RENOQUOTE_LOG_FORMAT"]),
    ));

    CommandResult { exit_code: 0, output: lines.join("\n") }
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    raw.parse::<Value>().ok()
}

fn field_source(
    key_path: &str,
    env_keys: &[&str],
    config_file_doc: Option<&Value>,
    config_file_path: Option<&Path>,
) -> String {
    for env_key in env_keys {
        let set = env::var(env_key).map(|value| !value.trim().is_empty()).unwrap_or(false);
        if set {
            return format!("env ({env_key})");
        }
    }

    if let Some(doc) = config_file_doc {
        if contains_path(doc, key_path) {
            let file_path = config_file_path
                .map(Path::to_path_buf)
                .unwrap_or_else(|| PathBuf::from("config file"));
            return format!("file ({})", file_path.display());
        }
    }

    "default".to_string()
}

fn contains_path(root: &Value, key_path: &str) -> bool {
    let mut current = root;
    for key in key_path.split('.') {
        let Some(next) = current.get(key) else {
            return false;
        };
        current = next;
    }
    true
}

fn render_line(key: &str, value: &str, source: String) -> String {
    format!("- {key} = {value} (source: {source})")
}

#[cfg(test)]
mod tests {
    use toml::Value;

    use super::contains_path;

    #[test]
    fn nested_keys_are_found_in_config_document() {
        let doc: Value = "[pricing]\nvat_country = \"spain\"\n".parse().expect("valid toml");

        assert!(contains_path(&doc, "pricing.vat_country"));
        assert!(!contains_path(&doc, "pricing.base_margin"));
        assert!(!contains_path(&doc, "logging.level"));
    }
}
