use std::path::Path;

use anyhow::{Result, bail};
use serde::Deserialize;

use crate::constants::MIB;
use crate::controller::FillConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub run_id: String,
    pub target_size_mib: u64,
    pub chunk_size_mib: u64,
    pub sub_chunk_mib: u64,
}

impl Config {
    /// Validate and convert to byte-denominated run parameters.
    pub fn fill_config(&self) -> Result<FillConfig> {
        if self.target_size_mib == 0 {
            bail!("target_size_mib must be positive");
        }
        if self.chunk_size_mib == 0 {
            bail!("chunk_size_mib must be positive");
        }
        if self.sub_chunk_mib == 0 {
            bail!("sub_chunk_mib must be positive");
        }
        if self.sub_chunk_mib > self.chunk_size_mib {
            bail!(
                "sub_chunk_mib {} exceeds chunk_size_mib {}",
                self.sub_chunk_mib,
                self.chunk_size_mib
            );
        }
        Ok(FillConfig {
            target_size_bytes: self.target_size_mib.saturating_mul(MIB),
            chunk_size_bytes: self.chunk_size_mib.saturating_mul(MIB),
            sub_chunk_bytes: self.sub_chunk_mib.saturating_mul(MIB),
        })
    }
}

pub fn load_config(path: Option<&Path>) -> Result<Config> {
    let bytes: Vec<u8> = if let Some(p) = path {
        std::fs::read(p)?
    } else {
        include_bytes!("../config/default.yml").to_vec()
    };

    let mut config: Config = serde_yaml::from_slice(&bytes)?;
    if config.run_id.trim().is_empty() {
        config.run_id = generate_run_id();
    }

    Ok(config)
}

fn generate_run_id() -> String {
    let now = chrono::Utc::now();
    format!("{}_{}", now.format("%Y%m%dT%H%M%SZ"), rand_suffix())
}

fn rand_suffix() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};
    let nanos = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.subsec_nanos())
        .unwrap_or(0);
    format!("{:08x}", nanos)
}

#[cfg(test)]
mod tests {
    use super::load_config;
    use crate::constants::MIB;

    #[test]
    fn default_config_loads_and_validates() {
        let cfg = load_config(None).expect("config");
        assert!(!cfg.run_id.is_empty());
        let fill = cfg.fill_config().expect("fill config");
        assert_eq!(fill.chunk_size_bytes, cfg.chunk_size_mib * MIB);
        assert!(fill.sub_chunk_bytes <= fill.chunk_size_bytes);
    }

    #[test]
    fn rejects_zero_chunk_size() {
        let mut cfg = load_config(None).expect("config");
        cfg.chunk_size_mib = 0;
        let err = cfg.fill_config().expect_err("should fail");
        assert!(err.to_string().contains("chunk_size_mib"));
    }

    #[test]
    fn rejects_sub_chunk_larger_than_chunk() {
        let mut cfg = load_config(None).expect("config");
        cfg.chunk_size_mib = 10;
        cfg.sub_chunk_mib = 20;
        let err = cfg.fill_config().expect_err("should fail");
        assert!(err.to_string().contains("sub_chunk_mib"));
    }
}
