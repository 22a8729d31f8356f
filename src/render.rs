use crate::config::AppConfig;
use crate::data::LoadedInputs;
use crate::index::EducationIndex;
use crate::legend::LegendLayout;
use crate::palette::ThresholdScale;
use crate::projection::Projection;
use crate::tooltip::{self, TooltipContent};
use crate::types::{education_attr, CountyFeature};
use anyhow::{Context, Result};
use askama::Template;
use geo::{LineString, MultiPolygon};
use rayon::prelude::*;
use std::collections::BTreeMap;
use std::fmt::Write;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::info;

const TITLE_Y: f64 = 30.0;
const DESCRIPTION_Y: f64 = 55.0;

/// One drawable county with everything the markup needs.
#[derive(Debug, Clone, PartialEq)]
pub struct CountyShape {
    pub fips: u32,
    pub fill: String,
    /// `data-education` value; `undefined` when the county has no record
    pub education: String,
    pub path: String,
}

/// Fully laid out map, ready to be turned into SVG or HTML.
#[derive(Debug, Clone)]
pub struct MapDocument {
    pub width: f64,
    pub height: f64,
    pub title: String,
    pub description: String,
    pub title_x: f64,
    pub title_y: f64,
    pub description_y: f64,
    pub counties_offset: f64,
    pub counties: Vec<CountyShape>,
    pub legend: LegendLayout,
    pub tooltips: BTreeMap<u32, TooltipContent>,
}

pub fn render_counties(
    features: &[CountyFeature],
    index: &EducationIndex,
    scale: &ThresholdScale,
    projection: &Projection,
) -> Vec<CountyShape> {
    features
        .par_iter()
        .map(|feature| {
            let value = index.attainment(feature.id);
            CountyShape {
                fips: feature.id,
                fill: scale.color_for(value).to_string(),
                education: education_attr(value),
                path: path_data(&projection.project_geometry(&feature.geometry)),
            }
        })
        .collect()
}

/// SVG path data, one closed subpath per ring.
pub fn path_data(geometry: &MultiPolygon<f64>) -> String {
    let mut d = String::new();
    for polygon in geometry {
        for ring in std::iter::once(polygon.exterior()).chain(polygon.interiors()) {
            write_ring(&mut d, ring);
        }
    }
    d
}

fn write_ring(d: &mut String, ring: &LineString<f64>) {
    let coords = &ring.0;
    // The closing position repeats the first; `Z` takes care of it.
    let len = if coords.len() > 1 && ring.is_closed() {
        coords.len() - 1
    } else {
        coords.len()
    };
    for (i, c) in coords[..len].iter().enumerate() {
        let command = if i == 0 { 'M' } else { 'L' };
        let _ = write!(d, "{}{},{}", command, fmt_num(c.x), fmt_num(c.y));
    }
    if len > 0 {
        d.push('Z');
    }
}

fn fmt_num(v: f64) -> String {
    let rounded = (v * 1000.0).round() / 1000.0;
    if rounded == 0.0 {
        "0".to_string()
    } else {
        rounded.to_string()
    }
}

impl MapDocument {
    pub fn build(config: &AppConfig, scale: &ThresholdScale, inputs: &LoadedInputs) -> Self {
        let map = &config.map;
        let counties = render_counties(
            &inputs.counties,
            &inputs.education,
            scale,
            &map.projection,
        );
        let tooltips = inputs
            .counties
            .iter()
            .map(|f| (f.id, TooltipContent::for_county(f.id, inputs.education.get(f.id))))
            .collect();
        let legend = LegendLayout::new(scale, &config.legend, map.inner_width(), map.inner_height());

        Self {
            width: map.width,
            height: map.height,
            title: map.title.clone(),
            description: map.description.clone(),
            title_x: map.inner_width() / 2.0,
            title_y: TITLE_Y,
            description_y: DESCRIPTION_Y,
            counties_offset: map.margin_top / 2.0,
            counties,
            legend,
            tooltips,
        }
    }

    pub fn render_svg(&self) -> Result<String> {
        MapSvg { doc: self }
            .render()
            .context("Failed to render SVG template")
    }

    pub fn render_html(&self) -> Result<String> {
        let svg = self.render_svg()?;
        let tooltips_json = serde_json::to_string(&self.tooltips)
            .context("Failed to serialise tooltip contents")?
            .replace("</", "<\\/");
        IndexPage {
            title: &self.title,
            svg,
            tooltips_json,
            opacity: tooltip::VISIBLE_OPACITY,
            fade_in_ms: tooltip::FADE_IN_MS,
            fade_out_ms: tooltip::FADE_OUT_MS,
            offset_x: tooltip::OFFSET_X,
            offset_y: tooltip::OFFSET_Y,
        }
        .render()
        .context("Failed to render HTML template")
    }

    /// Writes `map.svg` and `index.html` into `dir`.
    pub fn write_outputs(&self, dir: &Path) -> Result<(PathBuf, PathBuf)> {
        fs::create_dir_all(dir)
            .with_context(|| format!("Failed to create output directory: {:?}", dir))?;

        let svg_path = dir.join("map.svg");
        fs::write(&svg_path, self.render_svg()?)
            .with_context(|| format!("Failed to write {:?}", svg_path))?;

        let html_path = dir.join("index.html");
        fs::write(&html_path, self.render_html()?)
            .with_context(|| format!("Failed to write {:?}", html_path))?;

        info!("Wrote {} counties to {:?}", self.counties.len(), dir);
        Ok((svg_path, html_path))
    }
}

#[derive(Template)]
#[template(path = "map.svg")]
struct MapSvg<'a> {
    doc: &'a MapDocument,
}

#[derive(Template)]
#[template(path = "index.html")]
struct IndexPage<'a> {
    title: &'a str,
    svg: String,
    tooltips_json: String,
    opacity: f64,
    fade_in_ms: u32,
    fade_out_ms: u32,
    offset_x: f64,
    offset_y: f64,
}
