use serde::Deserialize;
use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

/// Deployment environment. Selects the store file when no explicit
/// `database_path` is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(try_from = "String")]
pub enum Environment {
    #[default]
    Development,
    Test,
    Production,
}

impl Environment {
    /// Store file name for this environment.
    pub fn database_file(&self) -> &'static str {
        match self {
            Environment::Development => "dev.db.json",
            Environment::Test => "test.db.json",
            Environment::Production => "db.json",
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "development" | "dev" => Ok(Environment::Development),
            "test" => Ok(Environment::Test),
            "production" | "prod" => Ok(Environment::Production),
            _ => Err(format!(
                "Invalid environment '{}'. Valid options: development, test, production",
                s
            )),
        }
    }
}

impl TryFrom<String> for Environment {
    type Error = String;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        s.parse()
    }
}

/// Server configuration
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Port to listen on
    pub port: u16,
    /// Selects the store file inside `data_dir`
    pub environment: Environment,
    /// Directory holding the store files
    pub data_dir: PathBuf,
    /// Explicit store file, overrides `environment` + `data_dir`
    pub database_path: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            port: 3000,
            environment: Environment::default(),
            data_dir: PathBuf::from("database"),
            database_path: None,
        }
    }
}

impl Config {
    /// Load configuration with priority: env vars > config file > defaults
    pub fn load(config_path: Option<PathBuf>) -> Result<Self, ConfigError> {
        Self::load_with_env(config_path, |key| std::env::var(key).ok())
    }

    /// Same as [`Config::load`], reading environment variables through `env`.
    pub fn load_with_env<F>(config_path: Option<PathBuf>, env: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        // Start with defaults
        let mut config = Self::default();

        let path = config_path
            .or_else(|| env("TODO_API_CONFIG").map(PathBuf::from))
            .unwrap_or_else(Self::default_config_path);
        if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| ConfigError::ReadError(path.clone(), e))?;
            config = serde_yaml::from_str(&contents)
                .map_err(|e| ConfigError::ParseError(path.clone(), e))?;
        }

        // Apply environment variable overrides
        if let Some(environment) = env("TODO_API_ENV") {
            config.environment = environment
                .parse()
                .map_err(|e| ConfigError::InvalidVar("TODO_API_ENV", e))?;
        }
        if let Some(port) = env("TODO_API_PORT") {
            config.port = port.parse().map_err(|_| {
                ConfigError::InvalidVar("TODO_API_PORT", format!("'{}' is not a valid port", port))
            })?;
        }
        if let Some(data_dir) = env("TODO_API_DATA_DIR") {
            config.data_dir = PathBuf::from(data_dir);
        }
        if let Some(db_path) = env("TODO_API_DATABASE_PATH") {
            config.database_path = Some(PathBuf::from(db_path));
        }

        Ok(config)
    }

    /// Default config file path: <config_dir>/todo-api/config.yaml
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("todo-api")
            .join("config.yaml")
    }

    /// Path of the JSON store file.
    pub fn database_path(&self) -> PathBuf {
        self.database_path
            .clone()
            .unwrap_or_else(|| self.data_dir.join(self.environment.database_file()))
    }
}

#[derive(Debug)]
pub enum ConfigError {
    ReadError(PathBuf, std::io::Error),
    ParseError(PathBuf, serde_yaml::Error),
    InvalidVar(&'static str, String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::ReadError(path, e) => {
                write!(f, "Failed to read config file '{}': {}", path.display(), e)
            }
            ConfigError::ParseError(path, e) => {
                write!(
                    f,
                    "Failed to parse config file '{}': {}",
                    path.display(),
                    e
                )
            }
            ConfigError::InvalidVar(var, e) => write!(f, "Invalid {}: {}", var, e),
        }
    }
}

impl std::error::Error for ConfigError {}
