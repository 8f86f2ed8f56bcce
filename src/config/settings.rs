use crate::emit::EventMap;
use crate::error::{ConvertError, Result};
use crate::rules::VariableTable;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;

/// Converter configuration.
///
/// The variable tables and the event map are static configuration: loaded
/// once, handed to the emitters as values, never reloaded at runtime.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Settings {
    /// Symbol table for the alert-format target (name -> expression text)
    #[serde(default)]
    pub alert_variables: HashMap<String, String>,
    /// Symbol table for the Zeek signature target
    #[serde(default)]
    pub zeek_variables: HashMap<String, String>,
    /// Action keyword -> event label mapping
    #[serde(default)]
    pub events: HashMap<String, String>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Settings {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(path.as_ref()).map_err(|e| {
            ConvertError::Config(format!("Failed to read config file: {}", e))
        })?;

        let settings: Settings = serde_yaml::from_str(&content)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, value) in self.alert_variables.iter().chain(&self.zeek_variables) {
            if name.is_empty() || value.is_empty() {
                return Err(ConvertError::Config(format!(
                    "Variable entries cannot be empty: {:?} -> {:?}",
                    name, value
                )));
            }
        }

        for (action, event) in &self.events {
            if action.is_empty() || event.is_empty() {
                return Err(ConvertError::Config(format!(
                    "Event entries cannot be empty: {:?} -> {:?}",
                    action, event
                )));
            }
        }

        Ok(())
    }

    pub fn default_config() -> Self {
        Settings {
            alert_variables: HashMap::new(),
            zeek_variables: HashMap::new(),
            events: HashMap::new(),
            logging: LoggingConfig::default(),
        }
    }

    /// Alert-target symbol table: built-in defaults plus overrides
    pub fn alert_table(&self) -> VariableTable {
        let mut table = VariableTable::alert_defaults();
        for (name, value) in &self.alert_variables {
            table.insert(name, value);
        }
        table
    }

    /// Zeek-target symbol table: built-in defaults plus overrides
    pub fn zeek_table(&self) -> VariableTable {
        let mut table = VariableTable::zeek_defaults();
        for (name, value) in &self.zeek_variables {
            table.insert(name, value);
        }
        table
    }

    /// Event map: built-in defaults plus overrides
    pub fn event_map(&self) -> EventMap {
        let mut map = EventMap::default();
        for (action, event) in &self.events {
            map.insert(action, event);
        }
        map
    }
}
