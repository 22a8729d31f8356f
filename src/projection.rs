use geo::{Coord, MapCoords, MultiPolygon};
use serde::Deserialize;

/// How topology coordinates become surface coordinates.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Projection {
    /// Coordinates are already projected to the drawing surface.
    #[default]
    Identity,
    /// Albers conic equal-area, for topologies stored as lon/lat degrees.
    Albers(AlbersParams),
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AlbersParams {
    pub scale: f64,
    pub translate: [f64; 2],
    /// Standard parallels in degrees
    pub parallels: [f64; 2],
    /// Longitude rotation in degrees (positive shifts the map east)
    pub rotate: f64,
    /// Projection centre as [lon, lat] after rotation
    pub center: [f64; 2],
}

impl Default for AlbersParams {
    fn default() -> Self {
        Self {
            scale: 1070.0,
            translate: [480.0, 290.0],
            parallels: [29.5, 45.5],
            rotate: 96.0,
            center: [-0.6, 38.7],
        }
    }
}

impl Projection {
    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        match self {
            Projection::Identity => coord,
            Projection::Albers(params) => params.project(coord),
        }
    }

    pub fn project_geometry(&self, geometry: &MultiPolygon<f64>) -> MultiPolygon<f64> {
        match self {
            Projection::Identity => geometry.clone(),
            Projection::Albers(_) => geometry.map_coords(|c| self.project(c)),
        }
    }
}

impl AlbersParams {
    fn cone(&self) -> (f64, f64, f64) {
        let sy0 = self.parallels[0].to_radians().sin();
        let n = (sy0 + self.parallels[1].to_radians().sin()) / 2.0;
        let c = 1.0 + sy0 * (2.0 * n - sy0);
        let r0 = c.sqrt() / n;
        (n, c, r0)
    }

    /// Unscaled conic equal-area coordinates, y pointing north.
    fn raw(&self, lambda: f64, phi: f64) -> (f64, f64) {
        let (n, c, r0) = self.cone();
        let r = (c - 2.0 * n * phi.sin()).max(0.0).sqrt() / n;
        (r * (lambda * n).sin(), r0 - r * (lambda * n).cos())
    }

    pub fn project(&self, coord: Coord<f64>) -> Coord<f64> {
        let lambda = wrap_degrees(coord.x + self.rotate).to_radians();
        let (x, y) = self.raw(lambda, coord.y.to_radians());
        let (cx, cy) = self.raw(self.center[0].to_radians(), self.center[1].to_radians());
        Coord {
            x: self.translate[0] + self.scale * (x - cx),
            y: self.translate[1] - self.scale * (y - cy),
        }
    }
}

fn wrap_degrees(deg: f64) -> f64 {
    let wrapped = (deg + 180.0).rem_euclid(360.0) - 180.0;
    if wrapped == -180.0 && deg > 0.0 {
        180.0
    } else {
        wrapped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn identity_is_passthrough() {
        let c = Coord { x: 12.5, y: -3.0 };
        assert_eq!(Projection::Identity.project(c), c);
    }

    #[test]
    fn albers_centre_lands_on_translate() {
        let params = AlbersParams::default();
        // The centre is expressed after the 96°W rotation.
        let p = params.project(Coord { x: -96.6, y: 38.7 });
        assert!((p.x - 480.0).abs() < 1e-9);
        assert!((p.y - 290.0).abs() < 1e-9);
    }

    #[test]
    fn albers_orientation() {
        let params = AlbersParams::default();
        let seattle = params.project(Coord { x: -122.3, y: 47.6 });
        let miami = params.project(Coord { x: -80.2, y: 25.8 });
        assert!(seattle.x < miami.x, "west should be left");
        assert!(seattle.y < miami.y, "north should be up");
    }

    #[test]
    fn wraps_longitude() {
        assert_eq!(wrap_degrees(190.0), -170.0);
        assert_eq!(wrap_degrees(-190.0), 170.0);
        assert_eq!(wrap_degrees(0.0), 0.0);
    }
}
