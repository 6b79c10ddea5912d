//! # Relay Configuration
//!
//! Unified configuration for every subsystem and runtime parameter.
//!
//! Values start from [`Default`] and are overridden by `GR_*` environment
//! variables. [`RelayConfig::validate`] rejects combinations that would
//! silently break delivery guarantees.
//!
//! | Variable | Default | Section |
//! |----------|---------|---------|
//! | `GR_QUEUE_WORKERS` | `4` | queue |
//! | `GR_QUEUE_MAX_MESSAGES` | `10` | queue |
//! | `GR_QUEUE_VISIBILITY_SECS` | `120` | queue |
//! | `GR_QUEUE_POLL_BACKOFF_MS` | `1000` | queue |
//! | `GR_QUEUE_MAX_RECEIVES` | unset | queue |
//! | `GR_GOSSIP_BUFFER` | `1024` | queue |
//! | `GR_ORACLE_CHANNEL_CAPACITY` | `1024` | queue |
//! | `GR_DEDUP_TTL_SECS` | `600` | dedup |
//! | `GR_DEDUP_SWEEP_SECS` | `30` | dedup |
//! | `GR_DEDUP_MAX_ENTRIES` | `1000000` | dedup |
//! | `GR_PARSER_URL` | `http://localhost:8080` | parser |
//! | `GR_PARSER_TIMEOUT_SECS` | `10` | parser |
//! | `GR_GUARDIAN_SETS` | unset (required) | guardian |
//! | `GR_GUARDIAN_REFRESH_SECS` | `60` | guardian |
//! | `GR_STORAGE_BACKEND` | `memory` | storage |
//! | `GR_DATA_DIR` | `./data` | storage |
//! | `GR_DRAIN_TIMEOUT_SECS` | `10` | shutdown |
//!
//! `GR_GUARDIAN_SETS` lists the guardian-set history: sets separated by `;`
//! in index order from 0, addresses within a set separated by `,` as 40 hex
//! digits with an optional `0x` prefix.

use gr_02_deduplication::DedupConfig;
use gr_05_queue_ingestion::ConsumerConfig;
use shared_types::GuardianAddress;
use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;

/// Complete relay configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RelayConfig {
    pub queue: QueueConfig,
    pub dedup: DedupSettings,
    pub parser: ParserConfig,
    pub guardian: GuardianConfig,
    pub storage: StorageConfig,
    pub shutdown: ShutdownConfig,
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{var}={value:?} is invalid: {reason}")]
    InvalidValue {
        var: &'static str,
        value: String,
        reason: String,
    },

    #[error("no guardian sets configured; set GR_GUARDIAN_SETS")]
    NoGuardianSets,

    #[error("guardian set {index} has no addresses")]
    EmptyGuardianSet { index: usize },

    #[error("queue workers must be at least 1")]
    NoWorkers,

    #[error("dedup TTL {ttl:?} must exceed the visibility timeout {visibility:?}")]
    DedupTtlTooShort {
        ttl: Duration,
        visibility: Duration,
    },

    #[error("storage backend 'rocksdb' requires building with the `rocksdb` feature")]
    RocksDbUnavailable,
}

/// Queue consumer and in-process channel configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueueConfig {
    /// Parallel consumer loops.
    pub workers: usize,
    /// Envelopes per receive call.
    pub max_messages: usize,
    /// Per-delivery visibility window; also the handling deadline.
    pub visibility_timeout: Duration,
    /// Pause after a failed receive.
    pub poll_backoff: Duration,
    /// Dead-letter a message after this many deliveries.
    pub max_receives: Option<u32>,
    /// Capacity of the gossip input channel.
    pub gossip_buffer: usize,
    /// Capacity of the price-oracle broadcast channel.
    pub oracle_channel_capacity: usize,
}

impl Default for QueueConfig {
    fn default() -> Self {
        let consumer = ConsumerConfig::default();
        Self {
            workers: consumer.workers,
            max_messages: consumer.max_messages,
            visibility_timeout: consumer.visibility_timeout,
            poll_backoff: consumer.poll_backoff,
            max_receives: None,
            gossip_buffer: 1024,
            oracle_channel_capacity: 1024,
        }
    }
}

/// Deduplicator configuration, shared by the gossip and parsing sides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DedupSettings {
    /// Retention of a completed key.
    pub ttl: Duration,
    /// Background sweep period.
    pub sweep_interval: Duration,
    /// Table size that triggers an inline sweep.
    pub max_entries: usize,
}

impl Default for DedupSettings {
    fn default() -> Self {
        let dedup = DedupConfig::default();
        Self {
            ttl: dedup.ttl,
            sweep_interval: dedup.sweep_interval,
            max_entries: dedup.max_entries,
        }
    }
}

/// Decode-service configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParserConfig {
    /// Base URL; requests go to `{base_url}/vaa/parser`.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for ParserConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8080".to_string(),
            timeout: Duration::from_secs(10),
        }
    }
}

/// Guardian-set history configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GuardianConfig {
    /// Address lists, one per set, in index order from 0.
    pub sets: Vec<Vec<GuardianAddress>>,
    /// Period of the history refresh task.
    pub refresh_interval: Duration,
}

impl Default for GuardianConfig {
    fn default() -> Self {
        Self {
            sets: Vec::new(),
            refresh_interval: Duration::from_secs(60),
        }
    }
}

/// Where parsed records are stored.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum StorageBackend {
    #[default]
    Memory,
    RocksDb,
}

impl FromStr for StorageBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "memory" => Ok(StorageBackend::Memory),
            "rocksdb" => Ok(StorageBackend::RocksDb),
            other => Err(format!("unknown backend '{other}', expected memory or rocksdb")),
        }
    }
}

/// Storage configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    pub backend: StorageBackend,
    /// Database directory for the RocksDB backend.
    pub data_dir: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: StorageBackend::Memory,
            data_dir: PathBuf::from("./data"),
        }
    }
}

/// Shutdown configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShutdownConfig {
    /// How long in-flight work may run after Ctrl+C.
    pub drain_timeout: Duration,
}

impl Default for ShutdownConfig {
    fn default() -> Self {
        Self {
            drain_timeout: ConsumerConfig::default().drain_timeout,
        }
    }
}

impl RelayConfig {
    /// Defaults overridden by `GR_*` environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Same as [`from_env`](Self::from_env) over an arbitrary variable source.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let mut config = Self::default();
        let env = Env(&lookup);

        env.parse("GR_QUEUE_WORKERS", &mut config.queue.workers)?;
        env.parse("GR_QUEUE_MAX_MESSAGES", &mut config.queue.max_messages)?;
        env.secs("GR_QUEUE_VISIBILITY_SECS", &mut config.queue.visibility_timeout)?;
        env.millis("GR_QUEUE_POLL_BACKOFF_MS", &mut config.queue.poll_backoff)?;
        if let Some(value) = env.get("GR_QUEUE_MAX_RECEIVES") {
            config.queue.max_receives = Some(parse_value("GR_QUEUE_MAX_RECEIVES", &value)?);
        }
        env.parse("GR_GOSSIP_BUFFER", &mut config.queue.gossip_buffer)?;
        env.parse("GR_ORACLE_CHANNEL_CAPACITY", &mut config.queue.oracle_channel_capacity)?;

        env.secs("GR_DEDUP_TTL_SECS", &mut config.dedup.ttl)?;
        env.secs("GR_DEDUP_SWEEP_SECS", &mut config.dedup.sweep_interval)?;
        env.parse("GR_DEDUP_MAX_ENTRIES", &mut config.dedup.max_entries)?;

        if let Some(url) = env.get("GR_PARSER_URL") {
            config.parser.base_url = url;
        }
        env.secs("GR_PARSER_TIMEOUT_SECS", &mut config.parser.timeout)?;

        if let Some(value) = env.get("GR_GUARDIAN_SETS") {
            config.guardian.sets = parse_guardian_sets(&value)?;
        }
        env.secs("GR_GUARDIAN_REFRESH_SECS", &mut config.guardian.refresh_interval)?;

        env.parse("GR_STORAGE_BACKEND", &mut config.storage.backend)?;
        if let Some(dir) = env.get("GR_DATA_DIR") {
            config.storage.data_dir = PathBuf::from(dir);
        }

        env.secs("GR_DRAIN_TIMEOUT_SECS", &mut config.shutdown.drain_timeout)?;

        Ok(config)
    }

    /// Reject configurations that cannot run or would weaken delivery
    /// guarantees.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.guardian.sets.is_empty() {
            return Err(ConfigError::NoGuardianSets);
        }
        if let Some(index) = self.guardian.sets.iter().position(Vec::is_empty) {
            return Err(ConfigError::EmptyGuardianSet { index });
        }
        if self.queue.workers == 0 {
            return Err(ConfigError::NoWorkers);
        }
        // A key evicted before its redelivery arrives would run twice.
        if self.dedup.ttl <= self.queue.visibility_timeout {
            return Err(ConfigError::DedupTtlTooShort {
                ttl: self.dedup.ttl,
                visibility: self.queue.visibility_timeout,
            });
        }
        if self.storage.backend == StorageBackend::RocksDb && !cfg!(feature = "rocksdb") {
            return Err(ConfigError::RocksDbUnavailable);
        }
        Ok(())
    }

    pub fn consumer_config(&self) -> ConsumerConfig {
        ConsumerConfig {
            workers: self.queue.workers,
            max_messages: self.queue.max_messages,
            visibility_timeout: self.queue.visibility_timeout,
            poll_backoff: self.queue.poll_backoff,
            drain_timeout: self.shutdown.drain_timeout,
        }
    }

    pub fn dedup_config(&self) -> DedupConfig {
        DedupConfig {
            ttl: self.dedup.ttl,
            sweep_interval: self.dedup.sweep_interval,
            max_entries: self.dedup.max_entries,
        }
    }
}

struct Env<'a, F>(&'a F);

impl<F: Fn(&str) -> Option<String>> Env<'_, F> {
    fn get(&self, var: &str) -> Option<String> {
        (self.0)(var).filter(|v| !v.trim().is_empty())
    }

    fn parse<T>(&self, var: &'static str, slot: &mut T) -> Result<(), ConfigError>
    where
        T: FromStr,
        T::Err: std::fmt::Display,
    {
        if let Some(value) = self.get(var) {
            *slot = parse_value(var, &value)?;
        }
        Ok(())
    }

    fn secs(&self, var: &'static str, slot: &mut Duration) -> Result<(), ConfigError> {
        if let Some(value) = self.get(var) {
            *slot = Duration::from_secs(parse_value(var, &value)?);
        }
        Ok(())
    }

    fn millis(&self, var: &'static str, slot: &mut Duration) -> Result<(), ConfigError> {
        if let Some(value) = self.get(var) {
            *slot = Duration::from_millis(parse_value(var, &value)?);
        }
        Ok(())
    }
}

fn parse_value<T>(var: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    value
        .trim()
        .parse()
        .map_err(|e: T::Err| ConfigError::InvalidValue {
            var,
            value: value.to_string(),
            reason: e.to_string(),
        })
}

fn parse_guardian_sets(value: &str) -> Result<Vec<Vec<GuardianAddress>>, ConfigError> {
    value
        .split(';')
        .map(|set| {
            set.split(',')
                .map(str::trim)
                .filter(|addr| !addr.is_empty())
                .map(parse_address)
                .collect::<Result<Vec<_>, _>>()
        })
        .collect()
}

fn parse_address(addr: &str) -> Result<GuardianAddress, ConfigError> {
    let invalid = |reason: String| ConfigError::InvalidValue {
        var: "GR_GUARDIAN_SETS",
        value: addr.to_string(),
        reason,
    };
    let digits = addr
        .strip_prefix("0x")
        .or_else(|| addr.strip_prefix("0X"))
        .unwrap_or(addr);
    let bytes = hex::decode(digits).map_err(|e| invalid(e.to_string()))?;
    bytes
        .try_into()
        .map_err(|b: Vec<u8>| invalid(format!("expected 20 bytes, got {}", b.len())))
}
