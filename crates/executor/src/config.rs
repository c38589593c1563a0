use config::{Config as ConfigLoader, Environment, File};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use atsp_core::cover::{GreedyDegreeVertexCover, MatchingVertexCover};
use atsp_core::exact::{DEFAULT_MAX_NODES, DummyOracle, HeldKarpOracle};
use atsp_core::traits::{ExactOracle, VertexCoverOracle};

use super::concorde::ConcordeOracle;
use super::error::Error;

const DEFAULT_CONFIG_FILE: &str = "Config.toml";
const ENV_PREFIX: &str = "ATSP";

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum ExactOracleKind {
    HeldKarp,
    Concorde,
}

#[derive(Debug, Deserialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum CoverOracleKind {
    Matching,
    GreedyDegree,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ExactConfig {
    pub oracle: ExactOracleKind,
    pub max_kernel_size: usize,
    pub time_budget_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ConcordeConfig {
    pub binary: PathBuf,
    /// Multiplier applied before rounding costs to the integers Concorde works on.
    pub scale: f64,
    pub timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct CoverConfig {
    pub oracle: CoverOracleKind,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SweepConfig {
    pub max_parallel: usize,
    pub beta_timeout_seconds: Option<u64>,
}

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub exact: ExactConfig,
    pub concorde: ConcordeConfig,
    pub cover: CoverConfig,
    pub sweep: SweepConfig,
}

impl Config {
    /// Exact oracle for the configured backend.
    ///
    /// With `compute_tour == false` the placeholder oracle is returned, so only kernel
    /// sizes are meaningful.
    pub fn exact_oracle(&self, compute_tour: bool) -> Arc<dyn ExactOracle> {
        if !compute_tour {
            return Arc::new(DummyOracle);
        }
        match self.exact.oracle {
            ExactOracleKind::HeldKarp => Arc::new(self.held_karp()),
            ExactOracleKind::Concorde => Arc::new(ConcordeOracle::new(
                self.concorde.binary.clone(),
                self.concorde.scale,
                self.concorde.timeout_seconds.map(Duration::from_secs),
            )),
        }
    }

    pub fn held_karp(&self) -> HeldKarpOracle {
        HeldKarpOracle::new(
            self.exact.max_kernel_size,
            self.exact.time_budget_seconds.map(Duration::from_secs),
        )
    }

    pub fn cover_oracle(&self) -> Arc<dyn VertexCoverOracle> {
        match self.cover.oracle {
            CoverOracleKind::Matching => Arc::new(MatchingVertexCover),
            CoverOracleKind::GreedyDegree => Arc::new(GreedyDegreeVertexCover),
        }
    }

    pub fn beta_timeout(&self) -> Option<Duration> {
        self.sweep.beta_timeout_seconds.map(Duration::from_secs)
    }
}

/// Loads configuration from built-in defaults, a TOML file and environment variables.
///
/// An explicit `path` must exist. Without one, `Config.toml` in the working directory is
/// used when present. Environment variables use the `ATSP` prefix and `__` between
/// section and key, e.g. `ATSP_EXACT__MAX_KERNEL_SIZE=18`.
pub fn load_config(path: Option<&Path>) -> Result<Config, Error> {
    let config_file_path: Option<PathBuf> = match path {
        Some(p) => {
            if !p.exists() {
                return Err(Error::ConfigLoadError(format!(
                    "Configuration file not found: {}",
                    p.display()
                )));
            }
            Some(p.to_path_buf())
        }
        None => {
            let base_path = env::current_dir().map_err(|e| {
                Error::ConfigLoadError(format!("Failed to determine current directory: {}", e))
            })?;
            Some(base_path.join(DEFAULT_CONFIG_FILE)).filter(|p| p.exists())
        }
    };

    let mut builder = ConfigLoader::builder()
        .set_default("exact.oracle", "held-karp")
        .and_then(|b| b.set_default("exact.max_kernel_size", DEFAULT_MAX_NODES as u64))
        .and_then(|b| b.set_default("concorde.binary", "concorde"))
        .and_then(|b| b.set_default("concorde.scale", 1000.0))
        .and_then(|b| b.set_default("cover.oracle", "matching"))
        .and_then(|b| b.set_default("sweep.max_parallel", default_parallelism() as u64))
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    if let Some(file) = &config_file_path {
        builder = builder.add_source(File::from(file.as_path()).required(true));
    }

    let s = builder
        .add_source(
            Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()
        .map_err(|e| Error::ConfigLoadError(e.to_string()))?;

    let app_config: Config = s
        .try_deserialize()
        .map_err(|e| Error::ConfigLoadError(format!("Failed to deserialize config: {}", e)))?;

    validate(&app_config)?;
    Ok(app_config)
}

fn validate(config: &Config) -> Result<(), Error> {
    if config.sweep.max_parallel == 0 {
        return Err(Error::ConfigLoadError(
            "sweep.max_parallel must be at least 1".into(),
        ));
    }
    if !(config.concorde.scale.is_finite() && config.concorde.scale > 0.0) {
        return Err(Error::ConfigLoadError(format!(
            "concorde.scale must be a positive number, got {}",
            config.concorde.scale
        )));
    }
    Ok(())
}

fn default_parallelism() -> usize {
    std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(1)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut file = tempfile::Builder::new()
            .suffix(".toml")
            .tempfile()
            .expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write config");
        file
    }

    #[test]
    fn file_overrides_defaults() {
        let file = write_config(
            "[exact]\noracle = \"concorde\"\nmax_kernel_size = 12\n\n[cover]\noracle = \"greedy-degree\"\n\n[sweep]\nmax_parallel = 3\nbeta_timeout_seconds = 30\n",
        );
        let config = load_config(Some(file.path())).expect("config should load");

        assert_eq!(config.exact.oracle, ExactOracleKind::Concorde);
        assert_eq!(config.exact.max_kernel_size, 12);
        assert_eq!(config.cover.oracle, CoverOracleKind::GreedyDegree);
        assert_eq!(config.sweep.max_parallel, 3);
        assert_eq!(config.beta_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.concorde.binary, PathBuf::from("concorde"));
    }

    #[test]
    fn oracles_follow_configuration() {
        let file = write_config("[cover]\noracle = \"greedy-degree\"\n");
        let config = load_config(Some(file.path())).expect("config should load");

        assert_eq!(config.exact_oracle(true).name(), "held-karp");
        assert_eq!(config.exact_oracle(false).name(), "dummy");
        assert!(!config.exact_oracle(false).is_exact());
        assert_eq!(config.cover_oracle().name(), "greedy-degree");
        assert_eq!(config.held_karp().max_nodes(), DEFAULT_MAX_NODES);
    }

    #[test]
    fn missing_explicit_file_is_an_error() {
        let result = load_config(Some(Path::new("definitely/not/here.toml")));
        assert!(matches!(result, Err(Error::ConfigLoadError(_))));
    }

    #[test]
    fn unknown_oracle_name_is_rejected() {
        let file = write_config("[exact]\noracle = \"gurobi\"\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(Error::ConfigLoadError(_))
        ));
    }

    #[test]
    fn zero_parallelism_is_rejected() {
        let file = write_config("[sweep]\nmax_parallel = 0\n");
        assert!(matches!(
            load_config(Some(file.path())),
            Err(Error::ConfigLoadError(_))
        ));
    }
}
