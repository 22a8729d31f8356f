use crate::projection::Projection;
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

pub const EDUCATION_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/for_user_education.json";
pub const COUNTY_URL: &str =
    "https://cdn.freecodecamp.org/testable-projects-fcc/data/choropleth_map/counties.json";

#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default)]
pub struct AppConfig {
    pub input: InputConfig,
    pub map: MapConfig,
    pub palette: PaletteConfig,
    pub legend: LegendConfig,
    pub output: OutputConfig,
    pub server: ServerConfig,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct InputConfig {
    /// URL or path of the county topology
    pub topology: String,
    /// URL or path of the education statistics
    pub education: String,
    /// Name of the object inside `objects` holding the counties
    pub topology_object: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct MapConfig {
    pub width: f64,
    pub height: f64,
    pub margin_top: f64,
    pub title: String,
    pub description: String,
    pub projection: Projection,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct PaletteConfig {
    pub thresholds: Vec<f64>,
    pub colors: Vec<String>,
    pub fallback: String,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct LegendConfig {
    pub width: f64,
    pub height: f64,
    pub offset_right: f64,
    pub offset_bottom: f64,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct OutputConfig {
    pub dir: PathBuf,
}

#[derive(Debug, Deserialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub port: u16,
}

impl Default for InputConfig {
    fn default() -> Self {
        Self {
            topology: COUNTY_URL.to_string(),
            education: EDUCATION_URL.to_string(),
            topology_object: "counties".to_string(),
        }
    }
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            width: 960.0,
            height: 680.0,
            margin_top: 100.0,
            title: "United States Educational Attainment".to_string(),
            description: "Percentage of adults age 25 and older with a bachelor's degree or higher (2010-2014)"
                .to_string(),
            projection: Projection::Identity,
        }
    }
}

impl MapConfig {
    /// Drawable width once margins are removed.
    pub fn inner_width(&self) -> f64 {
        self.width
    }

    pub fn inner_height(&self) -> f64 {
        self.height - self.margin_top
    }
}

impl Default for PaletteConfig {
    fn default() -> Self {
        Self {
            thresholds: vec![10.0, 20.0, 30.0, 40.0, 50.0, 60.0],
            colors: ["#f0f9e8", "#bae4bc", "#7bccc4", "#43a2ca", "#0868ac", "#023457"]
                .iter()
                .map(|c| c.to_string())
                .collect(),
            fallback: "#ccc".to_string(),
        }
    }
}

impl Default for LegendConfig {
    fn default() -> Self {
        Self {
            width: 250.0,
            height: 17.0,
            offset_right: 210.0,
            offset_bottom: 35.0,
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: PathBuf::from("output"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { port: 3000 }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig = toml::from_str(&content)
            .with_context(|| "Failed to parse TOML configuration")?;
        Ok(config)
    }

    /// Reads `path` when given, otherwise falls back to the built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load_from_file(path),
            None => Ok(Self::default()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn defaults_match_published_map() {
        let config = AppConfig::default();
        assert_eq!(config.map.width, 960.0);
        assert_eq!(config.map.inner_height(), 580.0);
        assert_eq!(config.input.topology, COUNTY_URL);
        assert_eq!(config.input.topology_object, "counties");
        assert_eq!(config.palette.colors.len(), 6);
        assert_eq!(config.palette.fallback, "#ccc");
        assert!(matches!(config.map.projection, Projection::Identity));
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            r#"
[input]
topology = "data/counties.json"

[server]
port = 8081

[map.projection]
kind = "albers"
scale = 1200.0
"#
        )
        .unwrap();

        let config = AppConfig::load(Some(file.path())).unwrap();
        assert_eq!(config.input.topology, "data/counties.json");
        assert_eq!(config.input.education, EDUCATION_URL);
        assert_eq!(config.server.port, 8081);
        assert_eq!(config.legend.width, 250.0);
        match config.map.projection {
            Projection::Albers(albers) => {
                assert_eq!(albers.scale, 1200.0);
                assert_eq!(albers.parallels, [29.5, 45.5]);
            }
            other => panic!("unexpected projection {:?}", other),
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        let err = AppConfig::load(Some(Path::new("/nonexistent/edumap.toml"))).unwrap_err();
        assert!(err.to_string().contains("Failed to read config file"));
    }
}
