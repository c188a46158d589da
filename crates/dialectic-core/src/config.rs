//! Configuration types for debates.
//!
//! Loaded from TOML, then optionally adjusted through `DEBATE_*`
//! environment variables. Everything is validated before the first
//! round starts.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use dialectic_voting::VotingConfig;

use crate::error::DebateError;
use crate::Result;

/// Overrides the consensus threshold.
pub const ENV_CONSENSUS_THRESHOLD: &str = "DEBATE_CONSENSUS_THRESHOLD";
/// Overrides the iteration cap.
pub const ENV_MAX_ITERATIONS: &str = "DEBATE_MAX_ITERATIONS";
/// Enables or disables voting.
pub const ENV_VOTING_ENABLED: &str = "DEBATE_VOTING_ENABLED";
/// Enables or disables classic three-round mode.
pub const ENV_CLASSIC_MODE: &str = "DEBATE_CLASSIC_MODE";
/// Enables or disables saving.
pub const ENV_SAVE_ENABLED: &str = "DEBATE_SAVE_ENABLED";
/// Overrides the per-call collaborator timeout.
pub const ENV_AGENT_TIMEOUT_SECS: &str = "DEBATE_AGENT_TIMEOUT_SECS";

/// What to do when a speaker cannot produce an argument.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ArgumentFailurePolicy {
    /// Discard the incomplete round and finalize the debate.
    #[default]
    AbortDebate,
    /// Record an explicit placeholder argument and carry on.
    Placeholder,
}

/// Where and whether finished debates are saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SaveConfig {
    /// Save after every round and at the end.
    pub enabled: bool,

    /// Directory for the JSON directory store.
    pub directory: PathBuf,
}

impl Default for SaveConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            directory: PathBuf::from("debates"),
        }
    }
}

/// Configuration for a debate run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DebateConfig {
    /// Collect votes and check for consensus.
    pub voting_enabled: bool,

    /// Run exactly three rounds with no voting.
    pub classic_mode: bool,

    /// Timeout for every collaborator call, in seconds.
    pub agent_timeout_secs: u64,

    /// Query voters concurrently instead of in speaking order.
    pub parallel_votes: bool,

    /// Ask agents for belief snapshots and run belief revision.
    pub track_beliefs: bool,

    /// Policy for failed argument generation.
    pub argument_failure: ArgumentFailurePolicy,

    /// Wall-clock budget for the whole debate.
    pub max_duration_secs: Option<u64>,

    /// Voting parameters.
    pub voting: VotingConfig,

    /// Persistence settings.
    pub save: SaveConfig,
}

impl Default for DebateConfig {
    fn default() -> Self {
        Self {
            voting_enabled: true,
            classic_mode: false,
            agent_timeout_secs: 30,
            parallel_votes: false,
            track_beliefs: false,
            argument_failure: ArgumentFailurePolicy::default(),
            max_duration_secs: None,
            voting: VotingConfig::default(),
            save: SaveConfig::default(),
        }
    }
}

/// Rounds played in classic mode.
pub const CLASSIC_ROUNDS: u32 = 3;

impl DebateConfig {
    /// Parses a TOML document.
    ///
    /// Missing keys take their defaults. The result is not validated.
    pub fn from_toml_str(raw: &str) -> Result<Self> {
        Ok(toml::from_str(raw)?)
    }

    /// Reads and parses a TOML file.
    ///
    /// # Errors
    ///
    /// - [`DebateError::ConfigRead`] if the file cannot be read
    /// - [`DebateError::ConfigParse`] if it is not a valid configuration
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| DebateError::ConfigRead {
            path: path.to_path_buf(),
            source,
        })?;
        debug!("Loaded configuration from {}", path.display());
        Self::from_toml_str(&raw)
    }

    /// Applies `DEBATE_*` overrides from the process environment.
    pub fn apply_env(&mut self) -> Result<()> {
        self.apply_env_with(|key| std::env::var(key).ok())
    }

    /// Applies `DEBATE_*` overrides using `lookup` to read variables.
    ///
    /// # Errors
    ///
    /// Returns [`DebateError::Config`] when a variable is set but cannot
    /// be parsed.
    pub fn apply_env_with<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_CONSENSUS_THRESHOLD) {
            self.voting.consensus_threshold = parse_env(ENV_CONSENSUS_THRESHOLD, &raw)?;
        }
        if let Some(raw) = lookup(ENV_MAX_ITERATIONS) {
            self.voting.max_iterations = parse_env(ENV_MAX_ITERATIONS, &raw)?;
        }
        if let Some(raw) = lookup(ENV_VOTING_ENABLED) {
            self.voting_enabled = parse_flag(ENV_VOTING_ENABLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_CLASSIC_MODE) {
            self.classic_mode = parse_flag(ENV_CLASSIC_MODE, &raw)?;
        }
        if let Some(raw) = lookup(ENV_SAVE_ENABLED) {
            self.save.enabled = parse_flag(ENV_SAVE_ENABLED, &raw)?;
        }
        if let Some(raw) = lookup(ENV_AGENT_TIMEOUT_SECS) {
            self.agent_timeout_secs = parse_env(ENV_AGENT_TIMEOUT_SECS, &raw)?;
        }
        Ok(())
    }

    /// Checks every configuration invariant.
    ///
    /// # Errors
    ///
    /// - [`DebateError::Voting`] for threshold, scoring or iteration problems
    /// - [`DebateError::Config`] for a zero timeout or duration budget
    pub fn validate(&self) -> Result<()> {
        self.voting.validate()?;

        if self.agent_timeout_secs == 0 {
            return Err(DebateError::Config(
                "agent_timeout_secs must be at least 1".to_string(),
            ));
        }
        if self.max_duration_secs == Some(0) {
            return Err(DebateError::Config(
                "max_duration_secs must be at least 1 when set".to_string(),
            ));
        }
        Ok(())
    }

    /// Per-call collaborator timeout.
    pub fn agent_timeout(&self) -> Duration {
        Duration::from_secs(self.agent_timeout_secs)
    }

    /// Wall-clock budget, if any.
    pub fn max_duration(&self) -> Option<Duration> {
        self.max_duration_secs.map(Duration::from_secs)
    }

    /// Whether votes are collected at all.
    pub fn voting_active(&self) -> bool {
        self.voting_enabled && !self.classic_mode
    }

    /// Number of rounds that will be played if nothing stops the debate early.
    pub fn round_limit(&self) -> u32 {
        if self.classic_mode {
            CLASSIC_ROUNDS
        } else {
            self.voting.max_iterations
        }
    }

    /// Sets the voting parameters.
    #[must_use]
    pub fn with_voting(mut self, voting: VotingConfig) -> Self {
        self.voting = voting;
        self
    }

    /// Enables or disables classic mode.
    #[must_use]
    pub fn with_classic_mode(mut self, enabled: bool) -> Self {
        self.classic_mode = enabled;
        self
    }

    /// Enables or disables voting.
    #[must_use]
    pub fn with_voting_enabled(mut self, enabled: bool) -> Self {
        self.voting_enabled = enabled;
        self
    }

    /// Sets the collaborator timeout.
    #[must_use]
    pub fn with_agent_timeout_secs(mut self, secs: u64) -> Self {
        self.agent_timeout_secs = secs;
        self
    }

    /// Enables concurrent vote collection.
    #[must_use]
    pub fn with_parallel_votes(mut self, enabled: bool) -> Self {
        self.parallel_votes = enabled;
        self
    }

    /// Enables belief tracking.
    #[must_use]
    pub fn with_belief_tracking(mut self, enabled: bool) -> Self {
        self.track_beliefs = enabled;
        self
    }

    /// Sets the argument failure policy.
    #[must_use]
    pub fn with_argument_failure(mut self, policy: ArgumentFailurePolicy) -> Self {
        self.argument_failure = policy;
        self
    }

    /// Sets the wall-clock budget.
    #[must_use]
    pub fn with_max_duration_secs(mut self, secs: u64) -> Self {
        self.max_duration_secs = Some(secs);
        self
    }

    /// Enables or disables saving.
    #[must_use]
    pub fn with_saving(mut self, enabled: bool) -> Self {
        self.save.enabled = enabled;
        self
    }
}

fn parse_env<T: std::str::FromStr>(key: &str, raw: &str) -> Result<T> {
    raw.trim()
        .parse()
        .map_err(|_| DebateError::Config(format!("{} has an invalid value '{}'", key, raw)))
}

fn parse_flag(key: &str, raw: &str) -> Result<bool> {
    match raw.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        _ => Err(DebateError::Config(format!(
            "{} must be a boolean, got '{}'",
            key, raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_default_config() {
        let config = DebateConfig::default();
        assert!(config.voting_enabled);
        assert!(!config.classic_mode);
        assert_eq!(config.agent_timeout_secs, 30);
        assert_eq!(config.argument_failure, ArgumentFailurePolicy::AbortDebate);
        assert!(config.save.enabled);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_toml() {
        let raw = r#"
            classic_mode = false
            parallel_votes = true
            argument_failure = "placeholder"

            [voting]
            consensus_threshold = 0.6
            voting_start_iteration = 1
            max_iterations = 5

            [voting.scoring]
            "1" = 3
            "2" = 2
            "3" = 1

            [save]
            directory = "out"
        "#;

        let config = DebateConfig::from_toml_str(raw).unwrap();
        assert!(config.parallel_votes);
        assert_eq!(config.argument_failure, ArgumentFailurePolicy::Placeholder);
        assert_eq!(config.voting.max_iterations, 5);
        assert_eq!(config.voting.scoring.top_points(), 3);
        assert_eq!(config.voting.scoring.len(), 3);
        assert_eq!(config.save.directory, PathBuf::from("out"));
        assert!(config.save.enabled);
    }

    #[test]
    fn test_from_toml_rejects_bad_scoring() {
        let raw = r#"
            [voting.scoring]
            "1" = 3
            "3" = 1
        "#;
        assert!(matches!(
            DebateConfig::from_toml_str(raw),
            Err(DebateError::ConfigParse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        let err = DebateConfig::load("/nonexistent/dialectic.toml").unwrap_err();
        assert!(matches!(err, DebateError::ConfigRead { .. }));
    }

    #[test]
    fn test_load_from_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("debate.toml");
        std::fs::write(&path, "track_beliefs = true\n").unwrap();

        let config = DebateConfig::load(&path).unwrap();
        assert!(config.track_beliefs);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = DebateConfig::default();
        config
            .apply_env_with(env(&[
                (ENV_CONSENSUS_THRESHOLD, "0.5"),
                (ENV_MAX_ITERATIONS, "7"),
                (ENV_VOTING_ENABLED, "false"),
                (ENV_CLASSIC_MODE, "yes"),
                (ENV_SAVE_ENABLED, "0"),
                (ENV_AGENT_TIMEOUT_SECS, "5"),
            ]))
            .unwrap();

        assert!((config.voting.consensus_threshold - 0.5).abs() < f64::EPSILON);
        assert_eq!(config.voting.max_iterations, 7);
        assert!(!config.voting_enabled);
        assert!(config.classic_mode);
        assert!(!config.save.enabled);
        assert_eq!(config.agent_timeout(), Duration::from_secs(5));
    }

    #[test]
    fn test_env_override_rejects_garbage() {
        let mut config = DebateConfig::default();
        let err = config
            .apply_env_with(env(&[(ENV_MAX_ITERATIONS, "lots")]))
            .unwrap_err();
        assert!(err.to_string().contains(ENV_MAX_ITERATIONS));

        let err = config
            .apply_env_with(env(&[(ENV_CLASSIC_MODE, "maybe")]))
            .unwrap_err();
        assert!(matches!(err, DebateError::Config(_)));
    }

    #[test]
    fn test_validate_rejects_zero_timeout() {
        let config = DebateConfig::default().with_agent_timeout_secs(0);
        assert!(matches!(config.validate(), Err(DebateError::Config(_))));
    }

    #[test]
    fn test_validate_surfaces_voting_errors() {
        let config =
            DebateConfig::default().with_voting(VotingConfig::default().with_threshold(-0.1));
        assert!(matches!(config.validate(), Err(DebateError::Voting(_))));
    }

    #[test]
    fn test_round_limit() {
        let config = DebateConfig::default();
        assert_eq!(config.round_limit(), 10);
        assert!(config.voting_active());

        let classic = config.with_classic_mode(true);
        assert_eq!(classic.round_limit(), CLASSIC_ROUNDS);
        assert!(!classic.voting_active());
    }

    #[test]
    fn test_config_serialization() {
        let config = DebateConfig::default().with_max_duration_secs(120);
        let json = serde_json::to_string(&config).unwrap();
        let parsed: DebateConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);
    }

    #[test]
    fn test_shipped_config_matches_defaults() {
        let path = concat!(env!("CARGO_MANIFEST_DIR"), "/../../config/debate.toml");
        let config = DebateConfig::load(path).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config, DebateConfig::default());
    }
}
