//! Buffer pool configuration, layered through the `config` crate so callers
//! can override defaults from a file or the environment the same way the
//! rest of the engine's CLI tooling does.

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Number of bytes in a single page / frame.
pub const PAGE_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct BufferPoolConfig {
    /// Number of page frames. Must be >= 1 and is fixed for the pool's
    /// lifetime.
    pub pool_size: usize,
    /// Number of buffer pool instances in a sharded deployment. Reserved;
    /// only affects page id allocation/validation when `num_instances > 1`.
    pub num_instances: u32,
    /// This instance's index within `num_instances`. Must be `< num_instances`.
    pub instance_index: u32,
}

impl Default for BufferPoolConfig {
    fn default() -> Self {
        BufferPoolConfig {
            pool_size: 64,
            num_instances: 1,
            instance_index: 0,
        }
    }
}

impl BufferPoolConfig {
    pub fn new(pool_size: usize) -> Self {
        BufferPoolConfig {
            pool_size,
            ..Default::default()
        }
    }

    pub fn sharded(pool_size: usize, num_instances: u32, instance_index: u32) -> Self {
        BufferPoolConfig {
            pool_size,
            num_instances,
            instance_index,
        }
    }

    /// Load configuration from `path` (if it exists) layered under the
    /// defaults, further overridable by `BUFFER_POOL_*` environment
    /// variables. Mirrors how the engine's other entry points build up a
    /// `config::Config`.
    pub fn from_file(path: &str) -> std::result::Result<Self, ConfigError> {
        let defaults = Self::default();
        let cfg = Config::builder()
            .set_default("pool_size", defaults.pool_size as i64)?
            .set_default("num_instances", defaults.num_instances as i64)?
            .set_default("instance_index", defaults.instance_index as i64)?
            .add_source(File::with_name(path).required(false))
            .add_source(Environment::with_prefix("BUFFER_POOL"))
            .build()?;
        cfg.try_deserialize()
    }

    pub(crate) fn validate(&self) {
        assert!(self.pool_size > 0, "pool_size must be >= 1");
        assert!(
            self.instance_index < self.num_instances.max(1),
            "instance_index must be < num_instances"
        );
    }
}
