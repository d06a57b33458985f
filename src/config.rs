use std::env;

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::ChunkOffset;

const MAX_CHUNK_SIZE_VAR: &str = "FLINTCOL_MAX_CHUNK_SIZE";
const PARALLEL_COMPRESSION_VAR: &str = "FLINTCOL_PARALLEL_COMPRESSION";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Row capacity of every chunk but the last
    pub max_chunk_size: usize,
    /// Compress a chunk's columns on the rayon pool instead of one after another
    pub parallel_compression: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            max_chunk_size: 65_535,
            parallel_compression: true,
        }
    }
}

impl Config {
    pub fn with_max_chunk_size(mut self, max_chunk_size: usize) -> Self {
        self.max_chunk_size = max_chunk_size;
        self
    }

    pub fn with_parallel_compression(mut self, parallel_compression: bool) -> Self {
        self.parallel_compression = parallel_compression;
        self
    }

    /// Defaults overridden by `FLINTCOL_MAX_CHUNK_SIZE` and `FLINTCOL_PARALLEL_COMPRESSION`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Config::default();

        if let Some(raw) = lookup(MAX_CHUNK_SIZE_VAR) {
            config.max_chunk_size = raw.trim().parse().map_err(|_| {
                Error::InvalidConfig(format!("{} is not a row count: {}", MAX_CHUNK_SIZE_VAR, raw))
            })?;
        }

        if let Some(raw) = lookup(PARALLEL_COMPRESSION_VAR) {
            config.parallel_compression = match raw.trim().to_ascii_lowercase().as_str() {
                "1" | "true" | "yes" | "on" => true,
                "0" | "false" | "no" | "off" => false,
                _ => {
                    return Err(Error::InvalidConfig(format!(
                        "{} is not a boolean: {}",
                        PARALLEL_COMPRESSION_VAR, raw
                    )))
                }
            };
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.max_chunk_size == 0 {
            return Err(Error::InvalidConfig("max_chunk_size must be positive".to_string()));
        }
        if self.max_chunk_size > ChunkOffset::MAX as usize {
            return Err(Error::InvalidConfig(format!(
                "max_chunk_size must not exceed {}",
                ChunkOffset::MAX
            )));
        }
        Ok(())
    }
}
