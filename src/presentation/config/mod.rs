mod environment;
mod settings;

pub use environment::Environment;
pub use settings::{
    LoggingSettings, ModelSettings, Settings, SettingsError, StorageProviderSetting,
    StorageSettings,
};
