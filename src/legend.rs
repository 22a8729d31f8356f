use crate::config::LegendConfig;
use crate::palette::ThresholdScale;

#[derive(Debug, Clone, PartialEq)]
pub struct Swatch {
    pub x: f64,
    pub width: f64,
    pub height: f64,
    pub color: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Tick {
    pub x: f64,
    pub label: String,
}

/// Colour key: one swatch per band in a row, with an axis underneath ticked
/// at every threshold.
#[derive(Debug, Clone, PartialEq)]
pub struct LegendLayout {
    pub translate_x: f64,
    pub translate_y: f64,
    pub width: f64,
    pub height: f64,
    pub swatches: Vec<Swatch>,
    pub ticks: Vec<Tick>,
}

impl LegendLayout {
    pub fn new(
        scale: &ThresholdScale,
        config: &LegendConfig,
        inner_width: f64,
        inner_height: f64,
    ) -> Self {
        let colors = scale.colors();
        let swatch_width = config.width / colors.len() as f64;
        let swatches = colors
            .iter()
            .enumerate()
            .map(|(i, color)| Swatch {
                x: i as f64 * swatch_width,
                width: swatch_width,
                height: config.height,
                color: color.clone(),
            })
            .collect();

        // Linear axis from 0 to the highest threshold.
        let domain_max = scale.thresholds().last().copied().unwrap_or(1.0);
        let ticks = scale
            .thresholds()
            .iter()
            .map(|&t| Tick {
                x: t / domain_max * config.width,
                label: format!("{}%", t),
            })
            .collect();

        Self {
            translate_x: inner_width - config.width - config.offset_right,
            translate_y: inner_height + config.offset_bottom,
            width: config.width,
            height: config.height,
            swatches,
            ticks,
        }
    }
}
