use crate::config::InputConfig;
use crate::index::EducationIndex;
use crate::topology::CountyTopology;
use crate::types::{CountyFeature, EducationRecord};
use anyhow::{Context, Result};
use serde::de::DeserializeOwned;
use std::fmt;
use std::path::PathBuf;
use tracing::info;

/// Where a dataset comes from: an http(s) URL or a local file.
#[derive(Debug, Clone, PartialEq)]
pub enum Source {
    Url(String),
    File(PathBuf),
}

impl Source {
    pub fn parse(location: &str) -> Self {
        if location.starts_with("http://") || location.starts_with("https://") {
            Source::Url(location.to_string())
        } else {
            Source::File(PathBuf::from(location))
        }
    }

    async fn read_bytes(&self) -> Result<Vec<u8>> {
        match self {
            Source::Url(url) => {
                let response = reqwest::get(url)
                    .await
                    .with_context(|| format!("Request failed: {}", url))?
                    .error_for_status()
                    .with_context(|| format!("Server rejected request: {}", url))?;
                let bytes = response
                    .bytes()
                    .await
                    .with_context(|| format!("Failed to read response body: {}", url))?;
                Ok(bytes.to_vec())
            }
            Source::File(path) => tokio::fs::read(path)
                .await
                .with_context(|| format!("Failed to open file: {:?}", path)),
        }
    }

    pub async fn fetch_json<T: DeserializeOwned>(&self) -> Result<T> {
        let bytes = self.read_bytes().await?;
        info!(source = %self, bytes = bytes.len(), "loaded");
        serde_json::from_slice(&bytes).with_context(|| format!("Malformed JSON from {}", self))
    }

    pub async fn fetch_text(&self) -> Result<String> {
        let bytes = self.read_bytes().await?;
        info!(source = %self, bytes = bytes.len(), "loaded");
        String::from_utf8(bytes).with_context(|| format!("Non UTF-8 content from {}", self))
    }
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Url(url) => f.write_str(url),
            Source::File(path) => write!(f, "{}", path.display()),
        }
    }
}

/// Both datasets, decoded and joined.
#[derive(Debug, Clone)]
pub struct LoadedInputs {
    pub counties: Vec<CountyFeature>,
    pub education: EducationIndex,
}

/// Loads the topology and the statistics concurrently. Either failure aborts
/// the whole load.
pub async fn load_inputs(config: &InputConfig) -> Result<LoadedInputs> {
    let topology_source = Source::parse(&config.topology);
    let education_source = Source::parse(&config.education);

    let (topology_text, records) = tokio::try_join!(
        topology_source.fetch_text(),
        education_source.fetch_json::<Vec<EducationRecord>>(),
    )?;

    let topology = CountyTopology::parse(&topology_text)
        .with_context(|| format!("Failed to decode topology from {}", topology_source))?;
    let counties = topology
        .features(&config.topology_object)
        .context("Failed to extract county features")?;
    info!("Decoded {} county shapes", counties.len());

    let education = EducationIndex::from_records(records);
    info!("Indexed {} education records", education.len());

    Ok(LoadedInputs {
        counties,
        education,
    })
}
