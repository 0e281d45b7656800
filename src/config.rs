//! Physics and playfield constants, optionally overridden from a TOML file.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use std::{fs, io};
use thiserror::Error;

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV: &str = "FLAPPY_GAP_CONFIG";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {path}: {source}")]
    Read { path: PathBuf, source: io::Error },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
    #[error("invalid tuning: {0}")]
    Invalid(String),
}

/// Everything the rules need to know about the world, in logical pixels
/// (origin top-left, y grows downward) and ticks.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub width: f64,
    pub height: f64,
    pub entity_x: f64,
    pub entity_width: f64,
    pub entity_height: f64,
    /// Added to velocity every tick.
    pub gravity: f64,
    /// Velocity set by a flap. Negative is up.
    pub jump: f64,
    /// Obstacle travel per tick.
    pub speed: f64,
    pub gap: f64,
    pub min_height: f64,
    pub obstacle_width: f64,
    /// How far past the left edge an obstacle travels before it is dropped.
    pub prune_margin: f64,
    /// Score line relative to `entity_x`.
    pub score_offset: f64,
    pub tick_ms: u64,
    pub spawn_ms: u64,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            width: 400.0,
            height: 600.0,
            entity_x: 50.0,
            entity_width: 30.0,
            entity_height: 30.0,
            gravity: 0.25,
            jump: -5.5,
            speed: 3.0,
            gap: 130.0,
            min_height: 50.0,
            obstacle_width: 30.0,
            prune_margin: 30.0,
            score_offset: -4.0,
            tick_ms: 20,
            spawn_ms: 2000,
        }
    }
}

impl Tuning {
    /// Load from `path`. A missing file yields the defaults.
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                log::debug!("no config at {}, using defaults", path.display());
                return Ok(Self::default());
            }
            Err(source) => {
                return Err(ConfigError::Read {
                    path: path.to_path_buf(),
                    source,
                });
            }
        };
        let tuning = Self::parse(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn parse(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(text)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fail = |msg: String| Err(ConfigError::Invalid(msg));
        let fields = [
            ("width", self.width),
            ("height", self.height),
            ("entity_x", self.entity_x),
            ("entity_width", self.entity_width),
            ("entity_height", self.entity_height),
            ("gravity", self.gravity),
            ("jump", self.jump),
            ("speed", self.speed),
            ("gap", self.gap),
            ("min_height", self.min_height),
            ("obstacle_width", self.obstacle_width),
            ("prune_margin", self.prune_margin),
            ("score_offset", self.score_offset),
        ];
        if let Some((name, _)) = fields.iter().find(|(_, v)| !v.is_finite()) {
            return fail(format!("{name} must be a finite number"));
        }
        if self.width <= 0.0 || self.height <= 0.0 {
            return fail("playfield must have a positive size".into());
        }
        if self.entity_width <= 0.0 || self.entity_height <= 0.0 || self.obstacle_width <= 0.0 {
            return fail("entity and obstacle sizes must be positive".into());
        }
        if self.prune_margin < 0.0 {
            return fail("prune_margin must not be negative".into());
        }
        if self.gravity <= 0.0 {
            return fail("gravity must pull downward (> 0)".into());
        }
        if self.jump >= 0.0 {
            return fail("jump must push upward (< 0)".into());
        }
        if self.speed <= 0.0 {
            return fail("speed must be positive".into());
        }
        if self.min_height < 0.0 || self.gap + 2.0 * self.min_height > self.height {
            return fail("gap plus both minimum heights must fit the playfield".into());
        }
        if self.entity_height >= self.height {
            return fail("entity must fit the playfield".into());
        }
        let line = self.score_line();
        if line <= 0.0 || line >= self.width {
            return fail(format!("score line x={line} lies outside the playfield"));
        }
        if self.tick_ms == 0 || self.spawn_ms == 0 {
            return fail("timer periods must be non-zero".into());
        }
        if self.tick_ms >= self.spawn_ms {
            return fail("tick period must be shorter than spawn period".into());
        }
        Ok(())
    }

    pub fn tick_period(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }

    pub fn spawn_period(&self) -> Duration {
        Duration::from_millis(self.spawn_ms)
    }

    /// Obstacles crossing this x score a point.
    pub fn score_line(&self) -> f64 {
        self.entity_x + self.score_offset
    }

    /// Entity top edge at the start of a game.
    pub fn start_y(&self) -> f64 {
        self.height / 2.0
    }

    /// Lowest legal top edge for the entity.
    pub fn floor_y(&self) -> f64 {
        self.height - self.entity_height
    }
}

/// `$FLAPPY_GAP_CONFIG`, else `flappy-gap.toml` in the platform config dir.
pub fn config_path() -> Option<PathBuf> {
    if let Some(path) = std::env::var_os(CONFIG_ENV) {
        return Some(PathBuf::from(path));
    }
    directories::ProjectDirs::from("", "", "flappy-gap")
        .map(|dirs| dirs.config_dir().join("flappy-gap.toml"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_default_score_line() {
        let t = Tuning::default();
        assert_eq!(t.score_line(), 46.0);
        assert_eq!(t.floor_y(), 570.0);
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let t = Tuning::parse("gravity = 0.5\ngap = 150.0\n").unwrap();
        assert_eq!(t.gravity, 0.5);
        assert_eq!(t.gap, 150.0);
        assert_eq!(t.jump, Tuning::default().jump);
        assert_eq!(t.spawn_ms, 2000);
    }

    #[test]
    fn test_rejects_upward_gravity() {
        let t = Tuning {
            gravity: -0.1,
            ..Tuning::default()
        };
        assert!(matches!(t.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_rejects_oversized_gap() {
        let t = Tuning {
            gap: 550.0,
            ..Tuning::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_tick_slower_than_spawn() {
        let t = Tuning {
            tick_ms: 3000,
            ..Tuning::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_non_finite_values() {
        let t = Tuning::parse("gravity = nan").unwrap();
        assert!(t.gravity.is_nan());
        assert!(matches!(t.validate(), Err(ConfigError::Invalid(_))));

        let t = Tuning::parse("speed = inf").unwrap();
        assert!(t.validate().is_err());

        let t = Tuning {
            entity_x: f64::NEG_INFINITY,
            ..Tuning::default()
        };
        assert!(t.validate().is_err());
    }

    #[test]
    fn test_rejects_non_positive_widths() {
        for t in [
            Tuning {
                entity_width: -30.0,
                ..Tuning::default()
            },
            Tuning {
                obstacle_width: 0.0,
                ..Tuning::default()
            },
        ] {
            assert!(t.validate().is_err());
        }
    }

    #[test]
    fn test_rejects_negative_prune_margin() {
        let t = Tuning {
            prune_margin: -500.0,
            ..Tuning::default()
        };
        assert!(t.validate().is_err());
        let t = Tuning {
            prune_margin: 0.0,
            ..Tuning::default()
        };
        assert!(t.validate().is_ok());
    }

    #[test]
    fn test_rejects_score_line_outside_playfield() {
        for offset in [400.0, 350.0, -50.0, -80.0] {
            let t = Tuning {
                score_offset: offset,
                ..Tuning::default()
            };
            assert!(t.validate().is_err(), "offset {offset} accepted");
        }
    }

    #[test]
    fn test_missing_file_gives_defaults() {
        let path = std::env::temp_dir().join("flappy-gap-test-no-such-config.toml");
        let t = Tuning::load(&path).unwrap();
        assert_eq!(t, Tuning::default());
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let path = std::env::temp_dir().join(format!(
            "flappy-gap-test-bad-config-{}.toml",
            std::process::id()
        ));
        fs::write(&path, "gravity = \"heavy\"").unwrap();
        let result = Tuning::load(&path);
        let _ = fs::remove_file(&path);
        assert!(matches!(result, Err(ConfigError::Parse { .. })));
    }
}
