//! Configuration types for RASA

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

use crate::error::{RasaError, Result};
use crate::knowledge::SummaryFormat;

/// Default configuration file looked up in the working directory
pub const CONFIG_FILE: &str = "rasa.toml";

/// Environment variable naming an extra configuration file
pub const CONFIG_PATH_ENV: &str = "RASA_CONFIG_PATH";

/// Main configuration for RASA
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RasaConfig {
    /// Knowledge bank configuration
    pub knowledge: KnowledgeConfig,

    /// Intent router configuration
    pub router: RouterConfig,

    /// Tool runtime configuration
    pub tools: ToolsConfig,
}

/// Knowledge bank configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KnowledgeConfig {
    /// Summary header; `{topic}` is replaced with the topic
    pub summary_header: String,

    /// Prefix for each finding in a summary
    pub bullet: String,

    /// Text used when a topic has no findings
    pub empty_marker: String,

    /// Findings saved when the bank is constructed
    pub seed: Vec<SeedFinding>,
}

impl Default for KnowledgeConfig {
    fn default() -> Self {
        let format = SummaryFormat::default();
        Self {
            summary_header: format.header,
            bullet: format.bullet,
            empty_marker: format.empty_marker,
            seed: Vec::new(),
        }
    }
}

impl KnowledgeConfig {
    /// Summary layout described by this configuration
    pub fn summary_format(&self) -> SummaryFormat {
        SummaryFormat {
            header: self.summary_header.clone(),
            bullet: self.bullet.clone(),
            empty_marker: self.empty_marker.clone(),
        }
    }
}

/// A finding to load at startup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedFinding {
    pub topic: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
}

/// Intent router configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RouterConfig {
    /// Phrases that route a message to the research agent
    pub research_keywords: Vec<String>,

    /// Phrases that route a message to the study agent
    pub study_keywords: Vec<String>,

    /// Separator after which the topic is read ("research facts on X")
    pub topic_delimiter: String,

    /// Topic assigned to general inquiries
    pub general_topic: String,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            research_keywords: vec!["research".to_string(), "find facts".to_string()],
            study_keywords: vec!["test me".to_string(), "explain".to_string()],
            topic_delimiter: " on ".to_string(),
            general_topic: "General Inquiry".to_string(),
        }
    }
}

/// Tool runtime configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ToolsConfig {
    /// Timeout applied to each tool execution
    #[serde(with = "humantime_serde")]
    pub default_timeout: Duration,
}

impl Default for ToolsConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(30),
        }
    }
}

impl RasaConfig {
    /// Layered configuration sources.
    ///
    /// Loads in this order:
    /// 1. Default configuration
    /// 2. `rasa.toml` in the working directory
    /// 3. The file named by `RASA_CONFIG_PATH`
    /// 4. `RASA_`-prefixed environment variables, nested with `__`
    ///    (e.g. `RASA_ROUTER__TOPIC_DELIMITER`)
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(RasaConfig::default()))
            .merge(Toml::file(CONFIG_FILE));

        if let Ok(path) = std::env::var(CONFIG_PATH_ENV) {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed("RASA_").split("__"))
    }

    /// Load configuration from files and environment variables.
    ///
    /// # Errors
    ///
    /// Returns an error if a configuration source is invalid.
    pub fn load() -> Result<Self> {
        Self::from_figment(Self::figment())
    }

    /// Load configuration from a specific file path layered over defaults.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(RasaError::Configuration(format!(
                "Configuration file not found: {}",
                path.display()
            )));
        }

        Self::from_figment(
            Figment::from(Serialized::defaults(RasaConfig::default())).merge(Toml::file(path)),
        )
    }

    /// Extract and validate configuration from a prepared figment
    pub fn from_figment(figment: Figment) -> Result<Self> {
        let config: RasaConfig = figment.extract().map_err(|e| {
            RasaError::Configuration(format!("Failed to load configuration: {}", e))
        })?;

        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if the configuration is invalid.
    pub fn validate(&self) -> Result<()> {
        self.knowledge.summary_format().validate()?;

        for (i, seed) in self.knowledge.seed.iter().enumerate() {
            if seed.topic.trim().is_empty() || seed.content.trim().is_empty() {
                return Err(RasaError::Configuration(format!(
                    "knowledge.seed[{}] needs a non-empty topic and content",
                    i
                )));
            }
        }

        let router = &self.router;
        if router.research_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(RasaError::Configuration(
                "router.research_keywords must not be empty".to_string(),
            ));
        }
        if router.study_keywords.iter().all(|k| k.trim().is_empty()) {
            return Err(RasaError::Configuration(
                "router.study_keywords must not be empty".to_string(),
            ));
        }
        if router.topic_delimiter.trim().is_empty() {
            return Err(RasaError::Configuration(
                "router.topic_delimiter must not be blank".to_string(),
            ));
        }
        if router.general_topic.trim().is_empty() {
            return Err(RasaError::Configuration(
                "router.general_topic must not be blank".to_string(),
            ));
        }

        if self.tools.default_timeout.is_zero() {
            return Err(RasaError::Configuration(
                "tools.default_timeout must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
