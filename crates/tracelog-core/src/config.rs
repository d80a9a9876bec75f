use ::config::{Config, ConfigError, Environment, File as ConfigFile};
use serde::Deserialize;

use crate::dates::DateFormat;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// SQLite file the `load` command writes into.
    pub database_path: String,
    /// Stems containing this substring are never picked as a cell's root.
    pub excluded_root_marker: String,
    pub date_format: DateFormat,
    /// Extensions picked up when walking a directory of annotation files.
    pub annotation_extensions: Vec<String>,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            database_path: "tracelog.db".to_string(),
            excluded_root_marker: crate::roots::DEFAULT_EXCLUDED_MARKER.to_string(),
            date_format: DateFormat::MonthDayYear,
            annotation_extensions: vec!["nml".to_string(), "xml".to_string()],
        }
    }
}

pub fn load_configuration() -> Result<AppConfig, ConfigError> {
    let defaults = AppConfig::default();
    let builder = Config::builder()
        .set_default("database_path", defaults.database_path)?
        .set_default("excluded_root_marker", defaults.excluded_root_marker)?
        .set_default("date_format", "month_day_year")?
        .set_default("annotation_extensions", defaults.annotation_extensions)?
        .add_source(ConfigFile::with_name("Config").required(false))
        .add_source(
            Environment::with_prefix("TRACELOG")
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("annotation_extensions"),
        )
        .build()?;
    builder.try_deserialize::<AppConfig>()
}

/// Extensions are compared case-insensitively and without a leading dot.
pub fn normalized_extensions(extensions: &[String]) -> Vec<String> {
    let mut result: Vec<String> = Vec::new();

    for ext in extensions {
        let ext = ext.trim().trim_start_matches('.').to_lowercase();
        if ext.is_empty() || result.contains(&ext) {
            continue;
        }
        result.push(ext);
    }

    result
}
