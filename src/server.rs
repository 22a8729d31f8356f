use crate::config::AppConfig;
use crate::data::LoadedInputs;
use crate::index::EducationIndex;
use crate::palette::ThresholdScale;
use crate::render::MapDocument;
use crate::tooltip::{Cursor, HoverEvent, TooltipState, TooltipView};
use crate::types::{education_attr, EducationRecord};
use anyhow::Result;
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use geo::algorithm::bounding_rect::BoundingRect;
use geo::algorithm::contains::Contains;
use geo::{MultiPolygon, Point};
use rstar::{RTree, RTreeObject, AABB};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tracing::info;

// Wrapper for RTree indexing
pub struct CountyEnvelope {
    index: usize,
    aabb: AABB<[f64; 2]>,
}

impl RTreeObject for CountyEnvelope {
    type Envelope = AABB<[f64; 2]>;
    fn envelope(&self) -> Self::Envelope {
        self.aabb
    }
}

pub struct AppState {
    pub html: String,
    pub svg: String,
    pub education: EducationIndex,
    pub scale: ThresholdScale,
    /// Projected county shapes, in the county group's coordinate space
    pub shapes: Vec<(u32, MultiPolygon<f64>)>,
    /// FIPS code to position in `shapes`
    pub by_fips: HashMap<u32, usize>,
    pub tree: RTree<CountyEnvelope>,
    pub counties_offset: f64,
}

impl AppState {
    pub fn new(config: &AppConfig, scale: ThresholdScale, inputs: LoadedInputs) -> Result<Self> {
        let doc = MapDocument::build(config, &scale, &inputs);
        let html = doc.render_html()?;
        let svg = doc.render_svg()?;

        let shapes: Vec<(u32, MultiPolygon<f64>)> = inputs
            .counties
            .iter()
            .map(|c| (c.id, config.map.projection.project_geometry(&c.geometry)))
            .collect();

        let by_fips = shapes
            .iter()
            .enumerate()
            .map(|(i, (fips, _))| (*fips, i))
            .collect();

        // Degenerate shapes have no bounds and simply never get hit.
        let tree_items: Vec<CountyEnvelope> = shapes
            .iter()
            .enumerate()
            .filter_map(|(i, (_, geometry))| {
                let rect = geometry.bounding_rect()?;
                Some(CountyEnvelope {
                    index: i,
                    aabb: AABB::from_corners(
                        [rect.min().x, rect.min().y],
                        [rect.max().x, rect.max().y],
                    ),
                })
            })
            .collect();
        let tree = RTree::bulk_load(tree_items);
        info!("Spatial index built over {} counties", tree.size());

        Ok(Self {
            html,
            svg,
            education: inputs.education,
            scale,
            shapes,
            by_fips,
            tree,
            counties_offset: doc.counties_offset,
        })
    }

    /// County under a point given in drawing-surface coordinates.
    pub fn county_at(&self, x: f64, y: f64) -> Option<u32> {
        let local = [x, y - self.counties_offset];
        let point = Point::new(local[0], local[1]);
        self.tree
            .locate_in_envelope_intersecting(&AABB::from_point(local))
            .filter_map(|candidate| self.shapes.get(candidate.index))
            .find(|(_, geometry)| geometry.contains(&point))
            .map(|(fips, _)| *fips)
    }
}

#[derive(Deserialize)]
pub struct HoverParams {
    x: f64,
    y: f64,
}

#[derive(Serialize)]
pub struct CountyResponse {
    fips: u32,
    record: Option<EducationRecord>,
    fill: String,
    education: String,
}

pub fn router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/", get(index_handler))
        .route("/map.svg", get(svg_handler))
        .route("/api/county/:fips", get(county_handler))
        .route("/api/hover", get(hover_handler))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

pub async fn start_server(port: u16, state: AppState) -> Result<()> {
    let addr = SocketAddr::from(([127, 0, 0, 1], port));
    info!("Starting server on http://{}", addr);

    let app = router(Arc::new(state));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;
    Ok(())
}

async fn index_handler(State(state): State<Arc<AppState>>) -> Html<String> {
    Html(state.html.clone())
}

async fn svg_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ([(header::CONTENT_TYPE, "image/svg+xml")], state.svg.clone())
}

async fn county_handler(
    State(state): State<Arc<AppState>>,
    Path(fips): Path<u32>,
) -> Result<Json<CountyResponse>, StatusCode> {
    if !state.by_fips.contains_key(&fips) {
        return Err(StatusCode::NOT_FOUND);
    }
    let record = state.education.get(fips).cloned();
    let value = record.as_ref().map(|r| r.bachelors_or_higher);
    Ok(Json(CountyResponse {
        fips,
        fill: state.scale.color_for(value).to_string(),
        education: education_attr(value),
        record,
    }))
}

async fn hover_handler(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HoverParams>,
) -> Json<TooltipView> {
    let event = match state.county_at(params.x, params.y) {
        Some(fips) => HoverEvent::Enter {
            fips,
            cursor: Cursor {
                x: params.x,
                y: params.y,
            },
        },
        None => HoverEvent::Leave,
    };
    Json(TooltipState::Hidden.apply(event).view(&state.education))
}
