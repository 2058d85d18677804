use serde::Deserialize;
use std::env;
use std::time::Duration;

use coachbook_pipeline::{AbandonedPolicy, PipelinePolicy};

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub redis: RedisConfig,
    pub business_rules: BusinessRules,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    /// When unset, a single-process in-memory lock store is used.
    pub url: Option<String>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct BusinessRules {
    #[serde(default = "default_lock_ttl")]
    pub lock_ttl_seconds: u64,
    #[serde(default = "default_sweep_interval")]
    pub sweep_interval_seconds: u64,
    /// When set, abandoned bookings are cancelled this many seconds after
    /// their lock lapses; when unset they are left pending.
    #[serde(default)]
    pub abandoned_grace_seconds: Option<u64>,
}

fn default_lock_ttl() -> u64 {
    600
}

fn default_sweep_interval() -> u64 {
    60
}

impl BusinessRules {
    pub fn pipeline_policy(&self) -> PipelinePolicy {
        PipelinePolicy {
            lock_ttl: Duration::from_secs(self.lock_ttl_seconds),
            abandoned: match self.abandoned_grace_seconds {
                Some(grace) => AbandonedPolicy::CancelAfter(Duration::from_secs(grace)),
                None => AbandonedPolicy::LeavePending,
            },
        }
    }
}

impl Config {
    pub fn load() -> Result<Self, config::ConfigError> {
        let run_mode = env::var("RUN_MODE").unwrap_or_else(|_| "development".into());

        let s = config::Config::builder()
            .add_source(config::File::with_name("config/default"))
            .add_source(config::File::with_name(&format!("config/{}", run_mode)).required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(config::Environment::with_prefix("COACHBOOK").separator("__"))
            .build()?;

        s.try_deserialize()
    }
}
