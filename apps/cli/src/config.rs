use prod_plan::PlanConfig;
use std::env;
use std::path::PathBuf;

#[derive(Clone, Debug)]
pub struct Config {
    /// JSON file with a `PlanConfig`; defaults apply when unset
    pub plan_config: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Self {
        Config {
            plan_config: env::var("PLAN_CONFIG")
                .ok()
                .filter(|v| !v.trim().is_empty())
                .map(PathBuf::from),
        }
    }

    /// A path given on the command line wins over `PLAN_CONFIG`.
    pub fn load_plan_config(&self, cli_path: Option<PathBuf>) -> Result<PlanConfig, ConfigError> {
        match cli_path.or_else(|| self.plan_config.clone()) {
            Some(path) => PlanConfig::from_json_file(&path)
                .map_err(|e| ConfigError::InvalidValue(format!("{}: {}", path.display(), e))),
            None => Ok(PlanConfig::default()),
        }
    }
}

#[derive(Debug)]
pub enum ConfigError {
    InvalidValue(String),
}

impl std::fmt::Display for ConfigError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConfigError::InvalidValue(var) => write!(f, "Invalid plan config: {}", var),
        }
    }
}

impl std::error::Error for ConfigError {}
