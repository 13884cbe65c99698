//! Server and playback configuration.

use serde::{Deserialize, Serialize};

/// Speeds offered to the user, in milliseconds per step.
pub const SPEED_PRESETS: [u64; 5] = [50, 100, 200, 400, 800];

/// Auto-advance timing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaybackConfig {
    /// Delay between automatic steps.
    pub speed_ms: u64,
    /// Lower bound applied to every speed change
    pub min_speed_ms: u64,
}

impl Default for PlaybackConfig {
    fn default() -> Self {
        Self {
            speed_ms: 200,
            min_speed_ms: 1,
        }
    }
}

impl PlaybackConfig {
    pub fn clamp_speed(&self, speed_ms: u64) -> u64 {
        speed_ms.max(self.min_speed_ms)
    }
}

/// Configuration for the visualization server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VisConfig {
    pub port: u16,
    /// Seed for generated graphs and datasets when a request omits one
    pub seed: u64,
    pub playback: PlaybackConfig,
}

impl Default for VisConfig {
    fn default() -> Self {
        Self {
            port: 3000,
            seed: 42,
            playback: PlaybackConfig::default(),
        }
    }
}

impl VisConfig {
    /// Read `[port] [seed]` positional arguments, keeping defaults for
    /// anything missing or unparsable.
    pub fn from_args<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut config = Self::default();
        let mut args = args.into_iter();
        if let Some(port) = args.next().and_then(|s| s.as_ref().parse().ok()) {
            config.port = port;
        }
        if let Some(seed) = args.next().and_then(|s| s.as_ref().parse().ok()) {
            config.seed = seed;
        }
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn args_override_defaults() {
        let config = VisConfig::from_args(["8080", "7"]);
        assert_eq!(config.port, 8080);
        assert_eq!(config.seed, 7);

        let config = VisConfig::from_args(["nope"]);
        assert_eq!(config, VisConfig::default());
    }

    #[test]
    fn speed_never_drops_below_minimum() {
        let playback = PlaybackConfig::default();
        assert_eq!(playback.clamp_speed(0), 1);
        assert_eq!(playback.clamp_speed(SPEED_PRESETS[2]), 200);
    }
}
