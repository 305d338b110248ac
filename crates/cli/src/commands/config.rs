use std::env;
use std::fs;
use std::path::Path;

use estimator_core::config::{resolve_config_path, AppConfig, LoadOptions};
use toml::Value;

pub fn run() -> String {
    let config = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => config,
        Err(error) => return format!("config validation failed: {error}"),
    };

    let config_file_path = resolve_config_path(None);
    let config_file_doc = load_config_file_doc(config_file_path.as_deref());
    let file = ConfigFile { doc: config_file_doc.as_ref(), path: config_file_path.as_deref() };

    let mut lines = vec!["effective config (source precedence: env > file > default):".to_string()];

    lines.push(render_line(
        "pricing.path",
        &config.pricing.path.display().to_string(),
        field_source("pricing.path", &["ESTIMATOR_PRICING_PATH"], &file),
    ));
    lines.push(render_line(
        "logging.level",
        &config.logging.level,
        field_source(
            "logging.level",
            &["ESTIMATOR_LOGGING_LEVEL", "ESTIMATOR_LOG_LEVEL"],
            &file,
        ),
    ));
    lines.push(render_line(
        "logging.format",
        config.logging.format.as_str(),
        field_source(
            "logging.format",
            &["ESTIMATOR_LOGGING_FORMAT", "ESTIMATOR_LOG_FORMAT"],
            &file,
        ),
    ));

    lines.join("\n")
}

struct ConfigFile<'a> {
    doc: Option<&'a Value>,
    path: Option<&'a Path>,
}

fn load_config_file_doc(path: Option<&Path>) -> Option<Value> {
    let path = path?;
    let raw = fs::read_to_string(path).ok()?;
    toml::from_str::<Value>(&raw).ok()
}

fn field_source(key_path: &str, env_keys: &[&str], file: &ConfigFile<'_>) -> String {
    if let Some(env_key) = env_keys.iter().find(|key| is_set(key)) {
        return format!("env ({env_key})");
    }

    if let Some(doc) = file.doc {
        if contains_path(doc, key_path) {
            let file_path = file
                .path
                .map(|path| path.display().to_string())
                .unwrap_or_else(|| "config file".to_string());
            return format!("file ({file_path})");
        }
    }

    "default".to_string()
}

fn is_set(key: &str) -> bool {
    env::var(key).map(|value| !value.trim().is_empty()).unwrap_or(false)
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
