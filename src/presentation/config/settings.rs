use std::path::PathBuf;

use config::builder::DefaultState;
use config::{Config, ConfigBuilder, ConfigError, File};
use serde::Deserialize;

use crate::application::services::ProvisionSettings;
use crate::domain::SelectionPolicy;
use crate::infrastructure::audio::WhisperLoadOptions;

use super::Environment;

#[derive(Debug, Clone, Deserialize)]
pub struct Settings {
    pub listen_host: String,
    pub listen_port: u16,
    pub model_bucket: String,
    pub model_folder: String,
    pub scratch_dir: String,
    pub model: ModelSettings,
    pub storage: StorageSettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ModelSettings {
    pub artifact_suffix: String,
    pub selection: SelectionPolicy,
    pub assets_repo: String,
    pub state_dict_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageSettings {
    pub provider: StorageProviderSetting,
    pub local_root: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StorageProviderSetting {
    Gcs,
    Local,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingSettings {
    pub json: bool,
}

#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("configuration error: {0}")]
    Source(#[from] ConfigError),
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

impl Settings {
    /// Defaults, then `appsettings.{environment}.*`, then `APP_*` variables
    /// (`APP_LISTEN_PORT`, `APP_MODEL__SELECTION`, ...).
    pub fn load(environment: Environment) -> Result<Self, SettingsError> {
        let config = Self::defaults()?
            .add_source(File::with_name(&environment.settings_file()).required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        Self::from_config(config)
    }

    pub fn defaults() -> Result<ConfigBuilder<DefaultState>, ConfigError> {
        Config::builder()
            .set_default("listen_host", "0.0.0.0")?
            .set_default("listen_port", 8081_i64)?
            .set_default("model_bucket", "vosyncore-transcription-dev")?
            .set_default("model_folder", "whisper-model")?
            .set_default("scratch_dir", "/tmp")?
            .set_default("model.artifact_suffix", ".pt")?
            .set_default("model.selection", "lexicographic")?
            .set_default("model.assets_repo", "openai/whisper-base")?
            .set_default("storage.provider", "gcs")?
            .set_default("storage.local_root", "./buckets")?
            .set_default("logging.json", false)
    }

    pub fn from_config(config: Config) -> Result<Self, SettingsError> {
        let settings: Settings = config.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if self.listen_port == 0 {
            return Err(SettingsError::Invalid("listen_port cannot be 0".to_string()));
        }

        let required = [
            ("model_bucket", &self.model_bucket),
            ("model_folder", &self.model_folder),
            ("scratch_dir", &self.scratch_dir),
            ("model.artifact_suffix", &self.model.artifact_suffix),
        ];
        if let Some((name, _)) = required.iter().find(|(_, value)| value.trim().is_empty()) {
            return Err(SettingsError::Invalid(format!("{name} must not be empty")));
        }

        Ok(())
    }

    pub fn scratch_dir(&self) -> PathBuf {
        PathBuf::from(&self.scratch_dir)
    }

    pub fn provision_settings(&self) -> ProvisionSettings {
        ProvisionSettings {
            bucket: self.model_bucket.clone(),
            folder: self.model_folder.clone(),
            artifact_suffix: self.model.artifact_suffix.clone(),
            selection: self.model.selection,
            scratch_dir: self.scratch_dir(),
        }
    }

    pub fn whisper_options(&self) -> WhisperLoadOptions {
        WhisperLoadOptions {
            assets_repo: self.model.assets_repo.clone(),
            state_dict_key: self.model.state_dict_key.clone(),
        }
    }
}
