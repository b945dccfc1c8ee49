use super::{
    evolution::EvolutionConfig,
    execution::ExecutionConfig,
    problem::ProblemConfig,
    traits::ConfigSection,
};
use crate::error::{GpError, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::{Arc, RwLock};

/// Prefix of environment overrides, e.g. `TYPEDGP_EVOLUTION__POPULATION_SIZE`
pub const ENV_PREFIX: &str = "TYPEDGP";

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub evolution: EvolutionConfig,
    pub execution: ExecutionConfig,
    pub problem: ProblemConfig,
}

impl AppConfig {
    pub fn validate(&self) -> Result<()> {
        self.evolution.validate()?;
        self.execution.validate()?;
        self.problem.validate()?;
        Ok(())
    }
}

pub struct ConfigManager {
    config: Arc<RwLock<AppConfig>>,
}

impl ConfigManager {
    pub fn new() -> Self {
        Self {
            config: Arc::new(RwLock::new(AppConfig::default())),
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let contents = std::fs::read_to_string(path)
            .map_err(|e| GpError::Configuration(format!("Failed to read config: {}", e)))?;

        let config: AppConfig = toml::from_str(&contents)
            .map_err(|e| GpError::Configuration(format!("Failed to parse config: {}", e)))?;

        config.validate()?;
        self.replace(config)
    }

    /// Defaults, then the optional TOML file, then `TYPEDGP_` environment
    /// variables (sections separated by `__`)
    pub fn load_layered(&self, path: Option<&Path>) -> Result<()> {
        let defaults = config::Config::try_from(&AppConfig::default())?;
        let mut builder = config::Config::builder().add_source(defaults);
        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path).format(config::FileFormat::Toml));
        }
        builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        );

        let config: AppConfig = builder.build()?.try_deserialize()?;
        config.validate()?;
        self.replace(config)
    }

    pub fn save_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let config = self.get()?;
        let toml_str = toml::to_string_pretty(&config)
            .map_err(|e| GpError::Configuration(format!("Failed to serialize: {}", e)))?;

        std::fs::write(path, toml_str)
            .map_err(|e| GpError::Configuration(format!("Failed to write config: {}", e)))?;

        Ok(())
    }

    pub fn get(&self) -> Result<AppConfig> {
        self.config
            .read()
            .map(|config| config.clone())
            .map_err(|_| GpError::Configuration("config lock poisoned".to_string()))
    }

    pub fn update<F>(&self, f: F) -> Result<()>
    where
        F: FnOnce(&mut AppConfig),
    {
        let mut config = self.get()?;
        f(&mut config);
        config.validate()?;
        self.replace(config)
    }

    fn replace(&self, config: AppConfig) -> Result<()> {
        let mut guard = self
            .config
            .write()
            .map_err(|_| GpError::Configuration("config lock poisoned".to_string()))?;
        *guard = config;
        Ok(())
    }
}

impl Default for ConfigManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_rejects_invalid_config() {
        let manager = ConfigManager::new();
        let result = manager.update(|c| c.evolution.population_size = 1);
        assert!(result.is_err());
        assert_eq!(manager.get().unwrap().evolution.population_size, 500);
    }
}
