use crate::error::{ConfigError, Result};

pub(crate) const MAX_WORKERS: usize = 1024;

#[derive(Debug, Clone)]
pub struct PoolConfig {
    pub num_threads: Option<usize>,
    pub stack_size: Option<usize>,
    pub thread_name_prefix: String,
}

impl Default for PoolConfig {
    fn default() -> Self {
        Self {
            num_threads: None,
            stack_size: Some(2 * 1024 * 1024),
            thread_name_prefix: "fixed-pool-worker".to_string(),
        }
    }
}

impl PoolConfig {
    pub fn builder() -> PoolConfigBuilder {
        PoolConfigBuilder::new()
    }

    pub fn validate(&self) -> Result<()> {
        if let Some(n) = self.num_threads {
            if n == 0 {
                return Err(ConfigError::InvalidWorkerCount(n));
            }
            if n > MAX_WORKERS {
                return Err(ConfigError::TooManyWorkers(n));
            }
        }

        if self.stack_size == Some(0) {
            return Err(ConfigError::InvalidStackSize);
        }

        if self.thread_name_prefix.is_empty() {
            return Err(ConfigError::EmptyThreadName);
        }

        Ok(())
    }

    pub fn worker_threads(&self) -> usize {
        self.num_threads.unwrap_or_else(num_cpus::get)
    }
}

#[derive(Debug, Default)]
pub struct PoolConfigBuilder {
    config: PoolConfig,
}

impl PoolConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: PoolConfig::default(),
        }
    }

    pub fn num_threads(mut self, n: usize) -> Self {
        self.config.num_threads = Some(n);
        self
    }

    pub fn stack_size(mut self, size: usize) -> Self {
        self.config.stack_size = Some(size);
        self
    }

    pub fn thread_name_prefix<S: Into<String>>(mut self, prefix: S) -> Self {
        self.config.thread_name_prefix = prefix.into();
        self
    }

    pub fn build(self) -> Result<PoolConfig> {
        self.config.validate()?;
        Ok(self.config)
    }
}
