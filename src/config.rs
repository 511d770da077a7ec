use anyhow::Context;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Longest accepted pause between two resolved actions.
pub const MAX_HIT_DELAY_MS: u64 = 60_000;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct GameConfig {
    pub battle: BattleConfig,
    pub stats: StatRanges,
    /// Simulated frame length used when a battle is driven headless.
    pub frame_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct BattleConfig {
    pub team_size: usize,
    /// Minimum interval between two resolved actions.
    pub hit_delay_ms: u64,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct StatRanges {
    pub base_hp: u32,
    pub max_atk: u32,
    pub max_def: u32,
    pub bot_stat_factor: f32,
}

impl Default for GameConfig {
    fn default() -> Self {
        GameConfig {
            battle: BattleConfig::default(),
            stats: StatRanges::default(),
            frame_ms: 16,
        }
    }
}

impl Default for BattleConfig {
    fn default() -> Self {
        BattleConfig {
            team_size: 6,
            hit_delay_ms: 200,
        }
    }
}

impl Default for StatRanges {
    fn default() -> Self {
        StatRanges {
            base_hp: 100,
            max_atk: 30,
            max_def: 20,
            bot_stat_factor: 0.85,
        }
    }
}

impl StatRanges {
    /// Upper bounds for rolled attack and defense, never below 1.
    pub fn caps(&self, is_bot: bool) -> (u32, u32) {
        let scale = |max: u32| {
            if is_bot {
                ((max as f32 * self.bot_stat_factor) as u32).max(1)
            } else {
                max.max(1)
            }
        };
        (scale(self.max_atk), scale(self.max_def))
    }
}

impl GameConfig {
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at {}", path.display()))?;
        let config: GameConfig = serde_json::from_str(&raw)
            .with_context(|| format!("Failed to parse JSON from {}", path.display()))?;
        config.validate()?;
        info!("Configuration loaded: {:?}", config);
        Ok(config)
    }

    pub fn load_or_default(path: Option<&Path>) -> anyhow::Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn validate(&self) -> anyhow::Result<()> {
        if self.battle.team_size == 0 {
            anyhow::bail!("battle.team_size must be > 0");
        }
        if self.battle.hit_delay_ms > MAX_HIT_DELAY_MS {
            anyhow::bail!("battle.hit_delay_ms must be <= {MAX_HIT_DELAY_MS}");
        }
        if self.stats.max_atk == 0 || self.stats.max_def == 0 {
            anyhow::bail!("stats.max_atk and stats.max_def must be >= 1");
        }
        if self.stats.bot_stat_factor.is_nan() || self.stats.bot_stat_factor <= 0.0 {
            anyhow::bail!("stats.bot_stat_factor must be > 0");
        }
        if self.frame_ms == 0 {
            anyhow::bail!("frame_ms must be > 0");
        }
        Ok(())
    }
}
