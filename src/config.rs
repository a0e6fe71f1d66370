use std::fmt;
use std::time::Duration;

use crate::piece::Shape;

// ============================================================================
// Defaults
// ============================================================================

pub const DEFAULT_WIDTH: usize = 10;
pub const DEFAULT_HEIGHT: usize = 20;
pub const DEFAULT_PREVIEW_COUNT: usize = 1;

// Timing (in milliseconds)
pub const DEFAULT_GRAVITY_BASE_MS: u64 = 500;
pub const DEFAULT_GRAVITY_STEP_MS: u64 = 50;
pub const DEFAULT_GRAVITY_MIN_MS: u64 = 100;

pub const MIN_WIDTH: usize = 4;
pub const MIN_HEIGHT: usize = 4;
/// Coordinates are carried as `i16`; keep well inside its range.
pub const MAX_DIMENSION: usize = 1024;

// ============================================================================
// Errors
// ============================================================================

#[derive(Clone, PartialEq, Eq, Debug)]
pub enum ConfigError {
    WidthOutOfRange(usize),
    HeightOutOfRange(usize),
    /// Some shape's spawn footprint would leave the grid columns.
    SpawnColumnOutOfRange { column: i16, width: usize },
    EmptyPreview,
    GravityFloorAboveBase { base_ms: u64, min_ms: u64 },
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::WidthOutOfRange(w) => {
                write!(f, "grid width {w} outside {MIN_WIDTH}..={MAX_DIMENSION}")
            }
            ConfigError::HeightOutOfRange(h) => {
                write!(f, "grid height {h} outside {MIN_HEIGHT}..={MAX_DIMENSION}")
            }
            ConfigError::SpawnColumnOutOfRange { column, width } => write!(
                f,
                "spawn column {column} does not fit every piece in a grid {width} wide"
            ),
            ConfigError::EmptyPreview => write!(f, "preview queue needs at least one slot"),
            ConfigError::GravityFloorAboveBase { base_ms, min_ms } => write!(
                f,
                "gravity floor {min_ms}ms is slower than the base interval {base_ms}ms"
            ),
        }
    }
}

impl std::error::Error for ConfigError {}

// ============================================================================
// Config
// ============================================================================

/// Host-supplied constants, fixed for the lifetime of a [`Game`](crate::Game).
#[derive(Clone, PartialEq, Eq, Debug)]
pub struct EngineConfig {
    pub width: usize,
    pub height: usize,
    /// Pivot column for new pieces. `None` means `width / 2`.
    pub spawn_column: Option<i16>,
    pub preview_count: usize,
    pub gravity_base_ms: u64,
    pub gravity_step_ms: u64,
    pub gravity_min_ms: u64,
    /// Seed for the default random piece provider.
    pub seed: Option<u64>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_WIDTH,
            height: DEFAULT_HEIGHT,
            spawn_column: None,
            preview_count: DEFAULT_PREVIEW_COUNT,
            gravity_base_ms: DEFAULT_GRAVITY_BASE_MS,
            gravity_step_ms: DEFAULT_GRAVITY_STEP_MS,
            gravity_min_ms: DEFAULT_GRAVITY_MIN_MS,
            seed: None,
        }
    }
}

impl EngineConfig {
    pub fn with_size(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            ..Self::default()
        }
    }

    pub fn spawn_column(&self) -> i16 {
        self.spawn_column.unwrap_or((self.width / 2) as i16)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(MIN_WIDTH..=MAX_DIMENSION).contains(&self.width) {
            return Err(ConfigError::WidthOutOfRange(self.width));
        }
        if !(MIN_HEIGHT..=MAX_DIMENSION).contains(&self.height) {
            return Err(ConfigError::HeightOutOfRange(self.height));
        }

        let column = self.spawn_column();
        let fits = Shape::ALL.iter().all(|shape| {
            shape.offsets(0).iter().all(|&(_, dc)| {
                let col = column + dc;
                col >= 0 && (col as usize) < self.width
            })
        });
        if !fits {
            return Err(ConfigError::SpawnColumnOutOfRange {
                column,
                width: self.width,
            });
        }

        if self.preview_count == 0 {
            return Err(ConfigError::EmptyPreview);
        }
        if self.gravity_min_ms > self.gravity_base_ms {
            return Err(ConfigError::GravityFloorAboveBase {
                base_ms: self.gravity_base_ms,
                min_ms: self.gravity_min_ms,
            });
        }
        Ok(())
    }

    /// Gravity interval at `level` (1-based).
    pub fn gravity_interval(&self, level: u32) -> Duration {
        let speed_reduction = u64::from(level.saturating_sub(1)) * self.gravity_step_ms;
        let ms = self
            .gravity_base_ms
            .saturating_sub(speed_reduction)
            .max(self.gravity_min_ms);
        Duration::from_millis(ms)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_config_is_valid() {
        let config = EngineConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert_eq!(config.spawn_column(), 5);
    }

    #[test]
    fn rejects_tiny_or_huge_grids() {
        assert_eq!(
            EngineConfig::with_size(3, 20).validate(),
            Err(ConfigError::WidthOutOfRange(3))
        );
        assert_eq!(
            EngineConfig::with_size(10, 2000).validate(),
            Err(ConfigError::HeightOutOfRange(2000))
        );
    }

    #[test]
    fn rejects_spawn_column_that_clips_the_i_piece() {
        let config = EngineConfig {
            spawn_column: Some(1),
            ..EngineConfig::default()
        };
        assert_eq!(
            config.validate(),
            Err(ConfigError::SpawnColumnOutOfRange { column: 1, width: 10 })
        );
    }

    #[test]
    fn smallest_grid_still_fits_every_spawn() {
        assert_eq!(EngineConfig::with_size(4, 4).validate(), Ok(()));
    }

    #[test]
    fn rejects_empty_preview_and_inverted_gravity() {
        let config = EngineConfig {
            preview_count: 0,
            ..EngineConfig::default()
        };
        assert_eq!(config.validate(), Err(ConfigError::EmptyPreview));

        let config = EngineConfig {
            gravity_base_ms: 80,
            ..EngineConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::GravityFloorAboveBase { .. })
        ));
    }

    #[test]
    fn gravity_speeds_up_per_level_down_to_floor() {
        let config = EngineConfig::default();
        assert_eq!(config.gravity_interval(1), Duration::from_millis(500));
        assert_eq!(config.gravity_interval(2), Duration::from_millis(450));
        assert_eq!(config.gravity_interval(9), Duration::from_millis(100));
        assert_eq!(config.gravity_interval(30), Duration::from_millis(100));
    }

    #[test]
    fn errors_render_readable_messages() {
        let msg = ConfigError::EmptyPreview.to_string();
        assert!(msg.contains("preview"));
    }
}
