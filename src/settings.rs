use std::fs;
use std::path::{Path, PathBuf};
use std::sync::RwLock;

use serde::{Deserialize, Serialize};

/// Default filename used to persist configuration within the data directory.
const CONFIG_FILENAME: &str = "config.json";

/// Settings for the embedded passage index and its embedding engine.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct IndexSettings {
    /// Optional override for the on-disk index location; defaults to a
    /// project data directory when unset.
    #[serde(default)]
    pub path: Option<PathBuf>,
    #[serde(default = "default_embedding_model")]
    pub embedding_model: String,
    #[serde(default = "default_embedding_dimensions")]
    pub embedding_dimensions: usize,
    /// Passage count per retrieval; tuned for recall without flooding the prompt.
    #[serde(default = "default_top_k")]
    pub top_k: usize,
}

impl Default for IndexSettings {
    fn default() -> Self {
        Self {
            path: None,
            embedding_model: default_embedding_model(),
            embedding_dimensions: default_embedding_dimensions(),
            top_k: default_top_k(),
        }
    }
}

/// Settings for the chat-completions generator.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneratorSettings {
    #[serde(default = "default_base_url")]
    pub base_url: String,
    #[serde(default = "default_llm_model")]
    pub model: String,
    /// Mild variation while staying stable; set to 0.0 for metric runs.
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for GeneratorSettings {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_llm_model(),
            temperature: default_temperature(),
        }
    }
}

/// Complete persisted configuration payload.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub index: IndexSettings,
    #[serde(default)]
    pub generator: GeneratorSettings,
}

impl AppConfig {
    /// Applies the process-environment overrides (`LLM_MODEL`,
    /// `LLM_TEMPERATURE`, `VECTOR_DB_PATH`, `REMEDY_TOP_K`) on top of the
    /// loaded file values.
    pub fn apply_env_overrides(&mut self) {
        self.apply_overrides_from(|key| std::env::var(key).ok());
    }

    fn apply_overrides_from<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(model) = lookup("LLM_MODEL") {
            self.generator.model = model;
        }
        if let Some(temperature) = lookup("LLM_TEMPERATURE") {
            if let Ok(parsed) = temperature.parse::<f32>() {
                self.generator.temperature = parsed;
            }
        }
        if let Some(path) = lookup("VECTOR_DB_PATH") {
            self.index.path = Some(PathBuf::from(path));
        }
        if let Some(top_k) = lookup("REMEDY_TOP_K") {
            if let Ok(parsed) = top_k.parse::<usize>() {
                self.index.top_k = parsed.max(1);
            }
        }
    }
}

/// Thread-safe manager responsible for loading and persisting `AppConfig`.
pub struct ConfigManager {
    path: PathBuf,
    state: RwLock<AppConfig>,
}

impl ConfigManager {
    /// Create a manager rooted at `data_dir`. The JSON file will be located at
    /// `<data_dir>/config.json`. Environment overrides win over file values.
    pub fn load(data_dir: impl AsRef<Path>) -> std::io::Result<Self> {
        let path = data_dir.as_ref().join(CONFIG_FILENAME);
        let mut config = if path.exists() {
            fs::read(&path)
                .ok()
                .and_then(|bytes| serde_json::from_slice::<AppConfig>(&bytes).ok())
                .unwrap_or_default()
        } else {
            AppConfig::default()
        };
        config.apply_env_overrides();

        Ok(Self {
            path,
            state: RwLock::new(config),
        })
    }

    /// Snapshot of the current configuration.
    pub fn current(&self) -> AppConfig {
        self.state.read().expect("config poisoned").clone()
    }

    /// Replace the generator settings and persist to disk.
    pub fn set_generator(&self, generator: GeneratorSettings) -> std::io::Result<AppConfig> {
        {
            let mut guard = self.state.write().expect("config poisoned");
            guard.generator = generator;
            self.persist_locked(&guard)?;
        }
        Ok(self.current())
    }

    /// Replace the index settings and persist to disk.
    pub fn set_index(&self, index: IndexSettings) -> std::io::Result<AppConfig> {
        {
            let mut guard = self.state.write().expect("config poisoned");
            guard.index = index;
            self.persist_locked(&guard)?;
        }
        Ok(self.current())
    }

    /// Ensure the backing directory exists and write the JSON payload.
    fn persist_locked(&self, config: &AppConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_vec_pretty(config)?;
        fs::write(&self.path, payload)
    }
}

/// Resolves the default data directory for the index and config file.
pub fn default_data_dir() -> Option<PathBuf> {
    directories::ProjectDirs::from("", "", "vaidya")
        .map(|dirs| dirs.data_dir().to_path_buf())
}

const fn default_embedding_dimensions() -> usize {
    256
}

const fn default_top_k() -> usize {
    12
}

const fn default_temperature() -> f32 {
    0.2
}

fn default_embedding_model() -> String {
    "vaidya/token-hash".to_string()
}

fn default_llm_model() -> String {
    "gpt-4o-mini".to_string()
}

fn default_base_url() -> String {
    "https://api.openai.com/v1".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn empty_payload_fills_every_default() {
        let config: AppConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config.index.top_k, 12);
        assert_eq!(config.generator.model, "gpt-4o-mini");
        assert!((config.generator.temperature - 0.2).abs() < f32::EPSILON);
        assert!(config.index.path.is_none());
    }

    #[test]
    fn env_overrides_win_over_file_values() {
        let mut config = AppConfig::default();
        let env: HashMap<&str, &str> = HashMap::from([
            ("LLM_MODEL", "gpt-4.1-mini"),
            ("LLM_TEMPERATURE", "0.0"),
            ("VECTOR_DB_PATH", "/tmp/remedy-index"),
            ("REMEDY_TOP_K", "4"),
        ]);
        config.apply_overrides_from(|key| env.get(key).map(|v| v.to_string()));

        assert_eq!(config.generator.model, "gpt-4.1-mini");
        assert_eq!(config.generator.temperature, 0.0);
        assert_eq!(config.index.path, Some(PathBuf::from("/tmp/remedy-index")));
        assert_eq!(config.index.top_k, 4);
    }

    #[test]
    fn malformed_env_values_are_ignored() {
        let mut config = AppConfig::default();
        config.apply_overrides_from(|key| {
            (key == "LLM_TEMPERATURE").then(|| "warm".to_string())
        });
        assert!((config.generator.temperature - 0.2).abs() < f32::EPSILON);
    }

    #[test]
    fn manager_round_trips_config_to_disk() {
        let dir = std::env::temp_dir().join(format!("vaidya-config-{}", uuid::Uuid::new_v4()));
        let manager = ConfigManager::load(&dir).unwrap();

        let updated = manager
            .set_generator(GeneratorSettings {
                base_url: "http://localhost:8080/v1".into(),
                model: "local-model".into(),
                temperature: 0.0,
            })
            .unwrap();
        assert_eq!(updated.generator.model, "local-model");

        let reloaded = ConfigManager::load(&dir).unwrap();
        // Environment may override the model on load; only check when unset.
        if std::env::var("LLM_MODEL").is_err() {
            assert_eq!(reloaded.current().generator.model, "local-model");
        }

        let _ = std::fs::remove_dir_all(&dir);
    }
}
