//! Mechanism for reading the pre-selection configuration
//!
//! The host framework owns the actual configuration file; the engine only
//! sees a key-value lookup. The one key the engine interprets itself is the
//! analysis channel, which gates the lepton-stage accept predicate.

use crate::error::{Error, Result};

use std::{collections::HashMap, str::FromStr};

/// Configuration key selecting the analysis channel
pub const CHANNEL_KEY: &str = "channel";

/// Key-value configuration lookup provided by the host framework
pub trait ConfigSource {
    /// Look up a raw configuration value
    fn get(&self, key: &str) -> Option<&str>;
}

/// Simple in-memory configuration source
#[derive(Default)]
pub struct KeyValueConfig {
    /// Raw key-value entries
    entries: HashMap<String, String>,
}
//
impl KeyValueConfig {
    /// Build an empty configuration (every key falls back to its default)
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a configuration entry, returning self for chained setup
    pub fn with(mut self, key: &str, value: &str) -> Self {
        self.entries.insert(key.to_owned(), value.to_owned());
        self
    }
}

impl ConfigSource for KeyValueConfig {
    fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }
}

/// Lepton-flavor mode gating the lepton-stage accept predicate
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Channel {
    /// Require at least one cleaned muon
    Muon,

    /// Require at least one cleaned electron
    Electron,

    /// Require at least one cleaned muon or electron
    Lepton,
}
//
impl Channel {
    /// Read the channel from a configuration source, defaulting to
    /// [`Channel::Lepton`] when the key is absent
    pub fn from_config(cfg: &dyn ConfigSource) -> Result<Self> {
        match cfg.get(CHANNEL_KEY) {
            Some(value) => value.parse(),
            None => Ok(Channel::Lepton),
        }
    }
}

impl FromStr for Channel {
    type Err = Error;

    /// Parse a channel string, rejecting anything but the three known modes
    fn from_str(s: &str) -> Result<Self> {
        match s {
            "muon" => Ok(Channel::Muon),
            "electron" => Ok(Channel::Electron),
            "lepton" => Ok(Channel::Lepton),
            other => Err(Error::Config(format!(
                "undefined value for '{CHANNEL_KEY}' key (must be 'muon', 'electron' or 'lepton'): {other}"
            ))),
        }
    }
}
