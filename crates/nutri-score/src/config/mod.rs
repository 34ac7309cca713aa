use crate::nutrition::{FieldMapping, OutputColumns, RubricDefinition, DEFAULT_GROUP_FIELD};
use std::env;
use std::fmt;
use std::fs::File;
use std::path::PathBuf;

/// Distinguishes runtime behavior for different stages of a deployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AppEnvironment {
    Development,
    Test,
    Production,
}

impl AppEnvironment {
    fn from_str(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "prod" | "production" => Self::Production,
            "test" | "ci" => Self::Test,
            _ => Self::Development,
        }
    }
}

/// Top-level configuration for scoring runs.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: AppEnvironment,
    pub scoring: ScoringConfig,
    pub telemetry: TelemetryConfig,
}

impl AppConfig {
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let environment = AppEnvironment::from_str(
            &env::var("NUTRI_ENV").unwrap_or_else(|_| "development".to_string()),
        );

        let rubric_path = env::var("NUTRI_RUBRIC_PATH")
            .ok()
            .filter(|value| !value.trim().is_empty())
            .map(PathBuf::from);
        let group_field =
            env::var("NUTRI_GROUP_FIELD").unwrap_or_else(|_| DEFAULT_GROUP_FIELD.to_string());
        let defaults = OutputColumns::default();
        let score_column = env::var("NUTRI_SCORE_COLUMN").unwrap_or(defaults.score);
        let grade_column = env::var("NUTRI_GRADE_COLUMN").unwrap_or(defaults.grade);

        if group_field.trim().is_empty() {
            return Err(ConfigError::EmptyColumn("NUTRI_GROUP_FIELD"));
        }
        if score_column.trim().is_empty() {
            return Err(ConfigError::EmptyColumn("NUTRI_SCORE_COLUMN"));
        }
        if grade_column.trim().is_empty() {
            return Err(ConfigError::EmptyColumn("NUTRI_GRADE_COLUMN"));
        }

        let log_level = env::var("NUTRI_LOG_LEVEL").unwrap_or_else(|_| "info".to_string());
        let log_format = match env::var("NUTRI_LOG_FORMAT") {
            Ok(value) => LogFormat::parse(&value)?,
            Err(_) => LogFormat::Compact,
        };

        Ok(Self {
            environment,
            scoring: ScoringConfig {
                rubric_path,
                group_field,
                columns: OutputColumns {
                    score: score_column,
                    grade: grade_column,
                },
            },
            telemetry: TelemetryConfig {
                log_level,
                log_format,
            },
        })
    }
}

/// Where the rubric comes from and which columns scoring reads and writes.
#[derive(Debug, Clone)]
pub struct ScoringConfig {
    pub rubric_path: Option<PathBuf>,
    pub group_field: String,
    pub columns: OutputColumns,
}

impl ScoringConfig {
    /// The configured rubric file, or the built-in rubric when none is set.
    pub fn rubric(&self) -> Result<RubricDefinition, ConfigError> {
        let Some(path) = &self.rubric_path else {
            return Ok(RubricDefinition::standard());
        };

        let file = File::open(path).map_err(|source| ConfigError::RubricIo {
            path: path.clone(),
            source,
        })?;
        RubricDefinition::from_json_reader(file).map_err(|source| ConfigError::RubricFormat {
            path: path.clone(),
            source,
        })
    }

    pub fn field_mapping(&self) -> FieldMapping {
        FieldMapping::standard().with_group_field(self.group_field.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogFormat {
    Compact,
    Full,
}

impl LogFormat {
    fn parse(value: &str) -> Result<Self, ConfigError> {
        match value.trim().to_ascii_lowercase().as_str() {
            "" | "compact" => Ok(Self::Compact),
            "full" => Ok(Self::Full),
            _ => Err(ConfigError::InvalidLogFormat(value.to_string())),
        }
    }
}

/// Tracing controls.
#[derive(Debug, Clone)]
pub struct TelemetryConfig {
    pub log_level: String,
    pub log_format: LogFormat,
}

#[derive(Debug)]
pub enum ConfigError {
    EmptyColumn(&'static str),
    InvalidLogFormat(String),
    RubricIo {
        path: PathBuf,
        source: std::io::Error,
    },
    RubricFormat {
        path: PathBuf,
        source: serde_json::Error,
    },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::EmptyColumn(variable) => write!(f, "{variable} must not be empty"),
            ConfigError::InvalidLogFormat(value) => {
                write!(f, "NUTRI_LOG_FORMAT must be 'compact' or 'full', got '{value}'")
            }
            ConfigError::RubricIo { path, .. } => {
                write!(f, "failed to open rubric file {}", path.display())
            }
            ConfigError::RubricFormat { path, .. } => {
                write!(f, "rubric file {} is not a valid rubric", path.display())
            }
        }
    }
}

impl std::error::Error for ConfigError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ConfigError::EmptyColumn(_) | ConfigError::InvalidLogFormat(_) => None,
            ConfigError::RubricIo { source, .. } => Some(source),
            ConfigError::RubricFormat { source, .. } => Some(source),
        }
    }
}
