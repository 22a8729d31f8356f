use crate::config::PaletteConfig;
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum PaletteError {
    #[error("palette needs at least one threshold")]
    Empty,
    #[error("{thresholds} thresholds but {colors} colors")]
    LengthMismatch { thresholds: usize, colors: usize },
    #[error("thresholds must be finite and strictly increasing (at position {0})")]
    NotIncreasing(usize),
    #[error("highest threshold must be positive, got {0}")]
    NonPositiveMax(f64),
    #[error("fallback color {0} is also a band color")]
    FallbackCollides(String),
}

/// Threshold colour scale: a value takes the colour of the first boundary
/// strictly above it, or the last colour once every boundary is reached.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdScale {
    thresholds: Vec<f64>,
    colors: Vec<String>,
    fallback: String,
}

impl ThresholdScale {
    pub fn new(
        thresholds: Vec<f64>,
        colors: Vec<String>,
        fallback: String,
    ) -> Result<Self, PaletteError> {
        if thresholds.is_empty() {
            return Err(PaletteError::Empty);
        }
        if thresholds.len() != colors.len() {
            return Err(PaletteError::LengthMismatch {
                thresholds: thresholds.len(),
                colors: colors.len(),
            });
        }
        if let Some(pos) = thresholds.iter().position(|t| !t.is_finite()) {
            return Err(PaletteError::NotIncreasing(pos));
        }
        if let Some(pos) = thresholds.windows(2).position(|w| w[0] >= w[1]) {
            return Err(PaletteError::NotIncreasing(pos + 1));
        }
        // The legend axis runs from 0 to the highest threshold.
        if let Some(&max) = thresholds.last() {
            if max <= 0.0 {
                return Err(PaletteError::NonPositiveMax(max));
            }
        }
        if colors.iter().any(|c| c.eq_ignore_ascii_case(&fallback)) {
            return Err(PaletteError::FallbackCollides(fallback));
        }
        Ok(Self {
            thresholds,
            colors,
            fallback,
        })
    }

    pub fn from_config(config: &PaletteConfig) -> Result<Self, PaletteError> {
        Self::new(
            config.thresholds.clone(),
            config.colors.clone(),
            config.fallback.clone(),
        )
    }

    /// Band for a finite value. Counts the boundaries at or below `value`,
    /// clamped to the last band.
    pub fn band_index(&self, value: f64) -> usize {
        let above = self.thresholds.partition_point(|t| *t <= value);
        above.min(self.colors.len() - 1)
    }

    /// Fill colour for an attainment value; missing or non-finite data gets
    /// the fallback.
    pub fn color_for(&self, value: Option<f64>) -> &str {
        match value {
            Some(v) if v.is_finite() => &self.colors[self.band_index(v)],
            _ => &self.fallback,
        }
    }

    pub fn thresholds(&self) -> &[f64] {
        &self.thresholds
    }

    pub fn colors(&self) -> &[String] {
        &self.colors
    }
}

impl Default for ThresholdScale {
    fn default() -> Self {
        let config = PaletteConfig::default();
        Self {
            thresholds: config.thresholds,
            colors: config.colors,
            fallback: config.fallback,
        }
    }
}
