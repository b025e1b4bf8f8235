// CLASSIFICATION: COMMUNITY
// Filename: config.rs v0.1
// Author: Lukas Bower
// Date Modified: 2026-10-18

//! Block pool geometry.

use serde::{Deserialize, Serialize};

use crate::error::{FsError, FsResult};

/// Default number of characters a single block stores.
pub const DEFAULT_BLOCK_SIZE: usize = 32;
/// Default number of blocks in the pool.
pub const DEFAULT_BLOCK_COUNT: usize = 16;

/// Geometry of the fixed block pool backing file contents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FsConfig {
    /// Characters per block.
    pub block_size: usize,
    /// Blocks in the pool.
    pub block_count: usize,
}

impl Default for FsConfig {
    fn default() -> Self {
        Self {
            block_size: DEFAULT_BLOCK_SIZE,
            block_count: DEFAULT_BLOCK_COUNT,
        }
    }
}

impl FsConfig {
    /// Build a geometry, rejecting empty pools and zero-sized blocks.
    pub fn new(block_size: usize, block_count: usize) -> FsResult<Self> {
        let cfg = Self {
            block_size,
            block_count,
        };
        cfg.validate()?;
        Ok(cfg)
    }

    /// Check the geometry can store at least one character.
    pub fn validate(&self) -> FsResult<()> {
        if self.block_size == 0 {
            return Err(FsError::InvalidConfig("block_size must be non-zero".into()));
        }
        if self.block_count == 0 {
            return Err(FsError::InvalidConfig(
                "block_count must be non-zero".into(),
            ));
        }
        Ok(())
    }

    /// Total characters the pool can hold.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.block_size.saturating_mul(self.block_count)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_classic_geometry() {
        let cfg = FsConfig::default();
        assert_eq!(cfg.block_size, 32);
        assert_eq!(cfg.block_count, 16);
        assert_eq!(cfg.capacity(), 512);
    }

    #[test]
    fn zero_geometry_rejected() {
        assert!(matches!(
            FsConfig::new(0, 4),
            Err(FsError::InvalidConfig(_))
        ));
        assert!(matches!(
            FsConfig::new(4, 0),
            Err(FsError::InvalidConfig(_))
        ));
    }

    #[test]
    fn partial_json_uses_defaults() {
        let cfg: FsConfig = serde_json::from_str(r#"{"block_size": 8}"#).expect("parse");
        assert_eq!(cfg, FsConfig::new(8, DEFAULT_BLOCK_COUNT).expect("valid"));
    }
}
