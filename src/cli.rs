//! Command line of the `tabrail-rpc` binary.
//!
//! With no subcommand the binary serves the bridge protocol on stdio.
//! `config` inspects or edits the settings file without starting it.

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::services::settings_engine::{SettingsEngine, SettingsEngineTrait};
use crate::types::errors::SettingsError;

#[derive(Parser, Debug)]
#[command(name = "tabrail-rpc", version, about = "Tab rail coordinator over stdin/stdout")]
pub struct Cli {
    /// Settings file. Takes precedence over TABRAIL_CONFIG.
    #[arg(long)]
    pub config: Option<String>,
    /// Debug logging regardless of the settings file.
    #[arg(long, default_value_t = false)]
    pub debug: bool,
    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Inspect or edit the settings file.
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum ConfigAction {
    /// Print the effective settings.
    Show,
    /// Print the settings file location.
    Path,
    /// Set one setting by dotted key, e.g. `overlay.script rail.js`.
    Set { key: String, value: String },
    /// Restore the defaults.
    Reset,
}

impl Cli {
    pub fn settings_engine(&self) -> SettingsEngine {
        match &self.config {
            Some(path) => SettingsEngine::new(Some(path.clone())),
            None => SettingsEngine::from_env(),
        }
    }
}

/// JSON when the text parses as JSON, otherwise a plain string, so
/// `set overlay.script rail.js` needs no quoting.
pub fn parse_value(raw: &str) -> Value {
    serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
}

/// Runs a `config` action and returns the text to print.
pub fn run_config<E: SettingsEngineTrait>(engine: &mut E, action: &ConfigAction) -> Result<String, SettingsError> {
    match action {
        ConfigAction::Show => {
            let settings = engine.load()?;
            serde_json::to_string_pretty(&settings)
                .map_err(|e| SettingsError::SerializationError(e.to_string()))
        }
        ConfigAction::Path => Ok(engine.get_config_path().to_string()),
        ConfigAction::Set { key, value } => {
            engine.load()?;
            let value = parse_value(value);
            engine.set_value(key, value.clone())?;
            Ok(format!("{} = {}", key, value))
        }
        ConfigAction::Reset => {
            engine.reset()?;
            Ok(format!("defaults written to {}", engine.get_config_path()))
        }
    }
}
