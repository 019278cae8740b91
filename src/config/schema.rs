//! Walkthrough file schema.
//!
//! ```yaml
//! name: halves-and-thirds
//! problem:
//!   kind: fraction-add
//!   operands: [1, 2, 1, 3]
//! playback:
//!   tick_period: 100ms
//!   pacing: 1
//! cues:
//!   complete: chime
//!   find_lcd: ~
//! ```

use std::time::Duration;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::clock::DEFAULT_TICK_PERIOD;
use crate::effect::{Cue, CueTable};
use crate::error::ConfigurationError;
use crate::phase::Phase;
use crate::problem::{Pacing, ProblemSpec};
use crate::session::SessionConfig;

// ============================================================================
// Top level
// ============================================================================

/// A walkthrough file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct WalkthroughConfig {
    /// Short identifier, used by presets
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    /// One-line description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// Problem to animate
    pub problem: ProblemSpec,

    /// Timing and start-up state
    #[serde(default)]
    pub playback: Playback,

    /// Per-phase cue overrides; `~` mutes a phase
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub cues: IndexMap<Phase, Option<Cue>>,
}

impl WalkthroughConfig {
    /// Wraps a problem with default playback.
    #[must_use]
    pub fn new(problem: ProblemSpec) -> Self {
        Self {
            name: None,
            description: None,
            problem,
            playback: Playback::default(),
            cues: IndexMap::new(),
        }
    }

    /// Session settings for this file.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigurationError::ZeroPacing`] for a zero pacing; the
    /// tick period is checked when the session is created.
    pub fn session_config(&self) -> Result<SessionConfig, ConfigurationError> {
        Ok(SessionConfig {
            problem: self.problem.clone(),
            tick_period: self.playback.tick_period,
            show_solution: self.playback.show_solution,
            paused: self.playback.paused,
            pacing: Pacing::new(self.playback.pacing)?,
            cues: CueTable::with_overrides(self.cues.clone()),
        })
    }
}

// ============================================================================
// Playback
// ============================================================================

/// Timing and start-up state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Playback {
    /// Period between ticks, e.g. `100ms`
    #[serde(default = "default_tick_period", with = "duration_text")]
    pub tick_period: Duration,

    /// Whether the walkthrough plays on start
    #[serde(default = "default_true")]
    pub show_solution: bool,

    /// Whether tick delivery starts suspended
    #[serde(default)]
    pub paused: bool,

    /// Phase duration multiplier
    #[serde(default = "default_pacing")]
    pub pacing: u32,

    /// Stop after this many ticks even if not complete
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_ticks: Option<u64>,
}

impl Default for Playback {
    fn default() -> Self {
        Self {
            tick_period: DEFAULT_TICK_PERIOD,
            show_solution: true,
            paused: false,
            pacing: 1,
            max_ticks: None,
        }
    }
}

const fn default_tick_period() -> Duration {
    DEFAULT_TICK_PERIOD
}

const fn default_true() -> bool {
    true
}

const fn default_pacing() -> u32 {
    1
}

/// Durations as humantime text (`250ms`, `1s`) or bare milliseconds.
mod duration_text {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer, de};

    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Millis(u64),
        Text(String),
    }

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&humantime::format_duration(*value))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        match Raw::deserialize(deserializer)? {
            Raw::Millis(ms) => Ok(Duration::from_millis(ms)),
            Raw::Text(text) => humantime::parse_duration(text.trim())
                .map_err(|e| de::Error::custom(format!("invalid duration '{text}': {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::problem::ProblemKind;

    #[test]
    fn test_minimal_file_uses_defaults() {
        let yaml = "problem:\n  kind: division\n  operands: [13, 4]\n";
        let config: WalkthroughConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.problem.kind, ProblemKind::Division);
        assert_eq!(config.playback, Playback::default());
        assert!(config.cues.is_empty());
    }

    #[test]
    fn test_tick_period_accepts_text_and_millis() {
        let text: Playback = serde_yaml::from_str("tick_period: 250ms").unwrap();
        assert_eq!(text.tick_period, Duration::from_millis(250));
        let millis: Playback = serde_yaml::from_str("tick_period: 40").unwrap();
        assert_eq!(millis.tick_period, Duration::from_millis(40));
        assert!(serde_yaml::from_str::<Playback>("tick_period: soon").is_err());
    }

    #[test]
    fn test_cue_overrides_and_mutes() {
        let yaml = "problem:\n  kind: limit\n  operands: [1]\ncues:\n  complete: chime\n  approach: ~\n";
        let config: WalkthroughConfig = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(config.cues.get(&Phase::Complete), Some(&Some(Cue::Chime)));
        assert_eq!(config.cues.get(&Phase::Approach), Some(&None));

        let session = config.session_config().unwrap();
        assert_eq!(session.cues.cue_for(Phase::Approach), None);
        assert_eq!(session.cues.cue_for(Phase::Substitute), Some(Cue::Click));
    }

    #[test]
    fn test_unknown_top_level_field_rejected() {
        let yaml = "problem:\n  kind: limit\n  operands: [1]\nspeed: 3\n";
        assert!(serde_yaml::from_str::<WalkthroughConfig>(yaml).is_err());
    }

    #[test]
    fn test_zero_pacing_rejected_for_session() {
        let mut config = WalkthroughConfig::new(ProblemSpec::new(ProblemKind::Limit, vec![1.0]));
        config.playback.pacing = 0;
        assert_eq!(
            config.session_config().unwrap_err(),
            ConfigurationError::ZeroPacing
        );
    }

    #[test]
    fn test_serializes_tick_period_as_text() {
        let yaml = serde_yaml::to_string(&Playback::default()).unwrap();
        assert!(yaml.contains("tick_period: 100ms"), "{yaml}");
    }
}
