use glam::DVec2;
use std::f64::consts::PI;

pub const MIN_ZOOM: f64 = 3.0;
pub const MAX_ZOOM: f64 = 12.0;
/// Zoom levels added or removed per zoom step
const ZOOM_STEP: f64 = 0.5;
const MAX_LAT: f64 = 85.0;

/// Viewport representing the visible map area and zoom level.
///
/// Zoom follows the slippy-map convention: the whole world is
/// `tile_size * 2^zoom` braille dots wide.
#[derive(Clone, Debug, PartialEq)]
pub struct Viewport {
    /// Center longitude (-180 to 180)
    pub center_lon: f64,
    /// Center latitude (-85 to 85)
    pub center_lat: f64,
    /// Zoom level (higher = more zoomed in)
    pub zoom: f64,
    /// Braille dots per world tile at zoom 0
    pub tile_size: f64,
    /// Canvas dot width
    pub width: usize,
    /// Canvas dot height
    pub height: usize,
}

/// Normalized Web Mercator position in [0, 1] x [0, 1]
#[inline(always)]
pub fn mercator(lon: f64, lat: f64) -> DVec2 {
    let x = (lon + 180.0) / 360.0;
    let lat_rad = lat.clamp(-MAX_LAT, MAX_LAT).to_radians();
    let y = (1.0 - (lat_rad.tan() + 1.0 / lat_rad.cos()).ln() / PI) / 2.0;
    DVec2::new(x, y)
}

/// Inverse of [`mercator`]
#[inline(always)]
pub fn inverse_mercator(m: DVec2) -> (f64, f64) {
    let lon = m.x * 360.0 - 180.0;
    let lat = (PI * (1.0 - 2.0 * m.y)).sinh().atan().to_degrees();
    (lon, lat)
}

impl Viewport {
    pub fn new(center_lon: f64, center_lat: f64, zoom: f64, tile_size: f64, width: usize, height: usize) -> Self {
        Self {
            center_lon,
            center_lat: center_lat.clamp(-MAX_LAT, MAX_LAT),
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
            tile_size,
            width,
            height,
        }
    }

    /// World width in dots at the current zoom
    #[inline(always)]
    pub fn world_size(&self) -> f64 {
        self.tile_size * 2f64.powf(self.zoom)
    }

    #[inline(always)]
    fn half_extent(&self) -> DVec2 {
        DVec2::new(self.width as f64 / 2.0, self.height as f64 / 2.0)
    }

    /// Project a geographic coordinate (lon, lat) to dot coordinates
    pub fn project(&self, lon: f64, lat: f64) -> (i32, i32) {
        let p = self.project_f(lon, lat);
        (p.x.round() as i32, p.y.round() as i32)
    }

    /// Sub-dot projection, used for hit testing
    pub fn project_f(&self, lon: f64, lat: f64) -> DVec2 {
        let offset = mercator(lon, lat) - mercator(self.center_lon, self.center_lat);
        offset * self.world_size() + self.half_extent()
    }

    /// Unproject dot coordinates back to geographic coordinates (lon, lat)
    pub fn unproject(&self, px: i32, py: i32) -> (f64, f64) {
        let offset = (DVec2::new(px as f64, py as f64) - self.half_extent()) / self.world_size();
        inverse_mercator(mercator(self.center_lon, self.center_lat) + offset)
    }

    /// Pan the viewport by a dot delta
    pub fn pan(&mut self, dx: i32, dy: i32) {
        let delta = DVec2::new(dx as f64, dy as f64) / self.world_size();
        let (lon, lat) = inverse_mercator(mercator(self.center_lon, self.center_lat) + delta);

        // Wrap longitude
        self.center_lon = if lon > 180.0 {
            lon - 360.0
        } else if lon < -180.0 {
            lon + 360.0
        } else {
            lon
        };
        self.center_lat = lat.clamp(-MAX_LAT, MAX_LAT);
    }

    pub fn zoom_in(&mut self) {
        self.zoom = (self.zoom + ZOOM_STEP).min(MAX_ZOOM);
    }

    pub fn zoom_out(&mut self) {
        self.zoom = (self.zoom - ZOOM_STEP).max(MIN_ZOOM);
    }

    /// Zoom in keeping the point under (px, py) fixed
    pub fn zoom_in_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, ZOOM_STEP);
    }

    /// Zoom out keeping the point under (px, py) fixed
    pub fn zoom_out_at(&mut self, px: i32, py: i32) {
        self.zoom_at(px, py, -ZOOM_STEP);
    }

    fn zoom_at(&mut self, px: i32, py: i32, step: f64) {
        let (lon, lat) = self.unproject(px, py);
        self.zoom = (self.zoom + step).clamp(MIN_ZOOM, MAX_ZOOM);

        // Pan so the anchored coordinate lands back under the pointer
        let (new_px, new_py) = self.project(lon, lat);
        self.pan(new_px - px, new_py - py);
    }

    /// Check if a projected point is visible in the viewport (with margin)
    pub fn is_visible(&self, px: i32, py: i32) -> bool {
        px >= -10 && px < self.width as i32 + 10 && py >= -10 && py < self.height as i32 + 10
    }

    /// Check if a line segment might be visible (rough bounding box check)
    pub fn line_might_be_visible(&self, p1: (i32, i32), p2: (i32, i32)) -> bool {
        let min_x = p1.0.min(p2.0);
        let max_x = p1.0.max(p2.0);
        let min_y = p1.1.min(p2.1);
        let max_y = p1.1.max(p2.1);

        max_x >= 0 && min_x < self.width as i32 && max_y >= 0 && min_y < self.height as i32
    }
}
