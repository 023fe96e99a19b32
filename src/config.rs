use std::{
    collections::BTreeSet,
    fs,
    path::{Path, PathBuf},
    time::Duration,
};

use anyhow::{Context, Result, anyhow, bail};
use jsonschema::{JSONSchema, ValidationError};
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::mind::types::{AgentRole, Coordinate, CoverageStrategy, DirtCategory, Orientation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub logging: LoggingConfig,
    pub world: WorldConfig,
    pub agents: Vec<AgentConfig>,
    #[serde(default)]
    pub mind: MindConfig,
    #[serde(default)]
    pub policy: PolicyConfig,
}

fn default_enabled_true() -> bool {
    true
}

fn default_logging_dir() -> PathBuf {
    PathBuf::from("./logs/sweeper")
}

fn default_logging_filter() -> String {
    "info".to_string()
}

fn default_logging_rotation() -> LoggingRotation {
    LoggingRotation::Daily
}

fn default_logging_retention_days() -> usize {
    14
}

fn default_max_ticks() -> u64 {
    500
}

fn default_tick_interval_ms() -> u64 {
    0
}

fn default_orientation() -> Orientation {
    Orientation::North
}

fn default_advisory_timeout_ms() -> u64 {
    5_000
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum LoggingRotation {
    Daily,
    Hourly,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_logging_dir")]
    pub dir: PathBuf,
    #[serde(default = "default_logging_filter")]
    pub filter: String,
    #[serde(default = "default_logging_rotation")]
    pub rotation: LoggingRotation,
    #[serde(default = "default_logging_retention_days")]
    pub retention_days: usize,
    #[serde(default = "default_enabled_true")]
    pub stderr_warn_enabled: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            dir: default_logging_dir(),
            filter: default_logging_filter(),
            rotation: default_logging_rotation(),
            retention_days: default_logging_retention_days(),
            stderr_warn_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DirtPlacement {
    pub x: i32,
    pub y: i32,
    pub category: DirtCategory,
}

impl DirtPlacement {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorldConfig {
    pub width: i32,
    pub height: i32,
    #[serde(default = "default_max_ticks")]
    pub max_ticks: u64,
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
    #[serde(default)]
    pub dirt: Vec<DirtPlacement>,
}

impl WorldConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AgentConfig {
    pub id: String,
    #[serde(flatten)]
    pub role: AgentRole,
    pub x: i32,
    pub y: i32,
    #[serde(default = "default_orientation")]
    pub orientation: Orientation,
}

impl AgentConfig {
    pub fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.x, self.y)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct MindConfig {
    #[serde(default)]
    pub coverage: CoverageStrategy,
}

#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PolicyConfig {
    #[default]
    Heuristic,
    Advisory {
        endpoint: String,
        model: String,
        #[serde(default)]
        api_key_env: Option<String>,
        #[serde(default = "default_advisory_timeout_ms")]
        timeout_ms: u64,
    },
}

impl Config {
    pub fn load(config_path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(config_path)
            .with_context(|| format!("failed to read {}", config_path.display()))?;
        let config_value: Value = json5::from_str(&config_content)
            .with_context(|| format!("failed to parse {}", config_path.display()))?;

        let config_base = config_path.parent().unwrap_or_else(|| Path::new("."));
        let schema_path = resolve_schema_path(config_base, &config_value)?;
        validate_against_schema(&config_value, &schema_path)?;

        let mut config: Config =
            serde_json::from_value(config_value).context("failed to deserialize sweeper config")?;
        config.validate()?;

        if !config.logging.dir.is_absolute() {
            config.logging.dir = config_base.join(&config.logging.dir);
        }

        Ok(config)
    }

    /// Checks the cross-field rules the schema cannot express.
    pub fn validate(&self) -> Result<()> {
        let world = &self.world;
        let in_bounds = |coordinate: Coordinate| {
            coordinate.x >= 0
                && coordinate.y >= 0
                && coordinate.x < world.width
                && coordinate.y < world.height
        };

        let mut ids = BTreeSet::new();
        let mut positions = BTreeSet::new();
        for agent in &self.agents {
            if !ids.insert(agent.id.as_str()) {
                bail!("duplicate agent id '{}'", agent.id);
            }
            if !in_bounds(agent.coordinate()) {
                bail!(
                    "agent '{}' starts outside the {}x{} grid at {}",
                    agent.id,
                    world.width,
                    world.height,
                    agent.coordinate()
                );
            }
            if !positions.insert(agent.coordinate()) {
                bail!("agent '{}' shares its start cell {}", agent.id, agent.coordinate());
            }
        }

        let explorers = self
            .agents
            .iter()
            .filter(|agent| matches!(agent.role, AgentRole::Explorer))
            .count();
        if explorers != 1 {
            bail!("exactly one explorer is required, found {explorers}");
        }

        if let Some(dirt) = world.dirt.iter().find(|dirt| !in_bounds(dirt.coordinate())) {
            bail!("dirt at {} lies outside the grid", dirt.coordinate());
        }

        Ok(())
    }
}

fn resolve_schema_path(config_base: &Path, config_value: &Value) -> Result<PathBuf> {
    if let Some(path_text) = config_value.get("$schema").and_then(|value| value.as_str()) {
        let configured = PathBuf::from(path_text);
        if configured.is_absolute() {
            return Ok(configured);
        }
        return Ok(config_base.join(&configured));
    }

    let local_default = config_base.join("sweeper.schema.json");
    if local_default.exists() {
        return Ok(local_default);
    }

    Err(anyhow!(
        "unable to resolve schema path: expected $schema in config \
         or sweeper.schema.json next to it"
    ))
}

fn validate_against_schema(config_value: &Value, schema_path: &Path) -> Result<()> {
    let schema_content = fs::read_to_string(schema_path)
        .with_context(|| format!("failed to read schema {}", schema_path.display()))?;
    let schema: Value = serde_json::from_str(&schema_content)
        .with_context(|| format!("failed to parse schema {}", schema_path.display()))?;

    let compiled =
        JSONSchema::compile(&schema).map_err(|e| anyhow!("failed to compile schema: {e}"))?;

    match compiled.validate(config_value) {
        Ok(()) => Ok(()),
        Err(errors_iter) => {
            let validation_errors: Vec<ValidationError> = errors_iter.collect();
            let messages: Vec<String> = validation_errors
                .into_iter()
                .map(|error| error.to_string())
                .collect();
            Err(anyhow!("config validation failed: {}", messages.join("; ")))
        }
    }
}
