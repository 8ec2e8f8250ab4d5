use crate::braille::BrailleCanvas;
use crate::color::Rgb;
use crate::config::BoundaryConfig;
use crate::data::{BoundaryData, Ring};
use crate::map::geometry::{draw_circle, draw_wide_line, fill_polygon};
use crate::map::projection::Viewport;
use crate::marker::{Marker, MarkerLayer};

/// Braille layers for one frame, back to front
pub struct MapLayers {
    pub boundary_fill: BrailleCanvas,
    pub boundary_outline: BrailleCanvas,
    pub markers: Vec<MarkerGlyph>,
}

/// A marker rasterised to character cells
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerGlyph {
    pub index: usize,
    pub color: Rgb,
    /// Lit braille cells of the disc
    pub cells: Vec<(u16, u16, char)>,
    /// Centre cell, where the count label goes; `None` when the centre is off the canvas
    pub center: Option<(u16, u16)>,
    pub count_label: String,
    /// District name placed above the disc
    pub name_label: Option<(u16, u16, String)>,
}

/// Display settings for map layers
#[derive(Clone)]
pub struct DisplaySettings {
    pub show_boundaries: bool,
    pub show_markers: bool,
    pub show_names: bool,
}

impl Default for DisplaySettings {
    fn default() -> Self {
        Self {
            show_boundaries: true,
            show_markers: true,
            show_names: true,
        }
    }
}

/// Map renderer: flat background, optional boundary overlay, district markers
pub struct MapRenderer {
    pub background: Rgb,
    pub boundary_style: BoundaryConfig,
    boundary: Option<BoundaryData>,
    pub settings: DisplaySettings,
}

impl MapRenderer {
    pub fn new(background: Rgb, boundary_style: BoundaryConfig) -> Self {
        Self {
            background,
            boundary_style,
            boundary: None,
            settings: DisplaySettings::default(),
        }
    }

    pub fn set_boundary(&mut self, data: BoundaryData) {
        self.boundary = Some(data);
    }

    pub fn boundary(&self) -> Option<&BoundaryData> {
        self.boundary.as_ref()
    }

    pub fn has_boundary(&self) -> bool {
        self.boundary.as_ref().is_some_and(|b| !b.is_empty())
    }

    /// Fill colour as seen over the background
    pub fn fill_color(&self) -> Rgb {
        let style = &self.boundary_style;
        style.fill_color.over(self.background, style.fill_opacity)
    }

    /// Outline colour as seen over the background
    pub fn outline_color(&self) -> Rgb {
        let style = &self.boundary_style;
        style.line_color.over(self.background, style.line_opacity)
    }

    /// Render all map features for a `width` x `height` character area
    pub fn render(&self, width: usize, height: usize, viewport: &Viewport, markers: &MarkerLayer) -> MapLayers {
        let mut boundary_fill = BrailleCanvas::new(width, height);
        let mut boundary_outline = BrailleCanvas::new(width, height);

        if self.settings.show_boundaries {
            if let Some(boundary) = &self.boundary {
                for polygon in boundary.polygons() {
                    let projected: Vec<Vec<(i32, i32)>> =
                        polygon.iter().map(|ring| project_ring(ring, viewport)).collect();
                    fill_polygon(&mut boundary_fill, &projected, self.boundary_style.fill_opacity);
                }
                for ring in boundary.rings() {
                    self.draw_ring(&mut boundary_outline, ring, viewport);
                }
            }
        }

        let markers = if self.settings.show_markers {
            self.rasterize_markers(width, height, viewport, markers)
        } else {
            Vec::new()
        };

        MapLayers {
            boundary_fill,
            boundary_outline,
            markers,
        }
    }

    /// Rasterise markers in table order; invisible ones are left out.
    /// Discs are clipped at the canvas edge, labels need the centre on the canvas.
    fn rasterize_markers(&self, width: usize, height: usize, viewport: &Viewport, layer: &MarkerLayer) -> Vec<MarkerGlyph> {
        let mut scratch = BrailleCanvas::new(width, height);
        let mut glyphs = Vec::with_capacity(layer.len());
        // Nothing larger than the canvas diagonal can change which dots light up
        let max_radius = ((width * 2).pow(2) as f64 + (height * 4).pow(2) as f64).sqrt().ceil() as i32;

        for (index, marker) in layer.markers().iter().enumerate() {
            let (px, py) = viewport.project(marker.lon, marker.lat);
            if !viewport.is_visible(px, py) {
                continue;
            }

            scratch.clear();
            draw_circle(&mut scratch, px, py, marker.radius_dots().min(max_radius));
            let cells: Vec<(u16, u16, char)> = scratch.lit_cells().collect();
            if cells.is_empty() {
                continue;
            }

            let on_canvas = px >= 0 && py >= 0 && ((px / 2) as usize) < width && ((py / 4) as usize) < height;
            let center = on_canvas.then(|| ((px / 2) as u16, (py / 4) as u16));
            glyphs.push(MarkerGlyph {
                index,
                color: marker.color,
                cells,
                center,
                count_label: marker.count_label(),
                name_label: center.and_then(|_| self.name_label(marker, px, py)),
            });
        }

        glyphs
    }

    /// Name label centred one row above the disc
    fn name_label(&self, marker: &Marker, px: i32, py: i32) -> Option<(u16, u16, String)> {
        if !self.settings.show_names {
            return None;
        }
        let row = (py - marker.radius_dots()) / 4 - 1;
        if row < 0 {
            return None;
        }
        let half = marker.district.chars().count() as i32 / 2;
        let col = (px / 2 - half).max(0);
        Some((col as u16, row as u16, marker.district.clone()))
    }

    /// Draw a closed ring with viewport culling
    fn draw_ring(&self, canvas: &mut BrailleCanvas, ring: &Ring, viewport: &Viewport) {
        if ring.len() < 2 {
            return;
        }

        let width = self.boundary_style.line_width;
        let mut prev: Option<(i32, i32)> = None;

        for &(lon, lat) in ring {
            let (px, py) = viewport.project(lon, lat);

            if let Some((prev_x, prev_y)) = prev {
                if viewport.line_might_be_visible((prev_x, prev_y), (px, py)) {
                    draw_wide_line(canvas, prev_x, prev_y, px, py, width);
                }
            }

            prev = Some((px, py));
        }
    }

    /// Toggle boundary overlay
    pub fn toggle_boundaries(&mut self) {
        self.settings.show_boundaries = !self.settings.show_boundaries;
    }

    /// Toggle district markers
    pub fn toggle_markers(&mut self) {
        self.settings.show_markers = !self.settings.show_markers;
    }

    /// Toggle district name labels
    pub fn toggle_names(&mut self) {
        self.settings.show_names = !self.settings.show_names;
    }
}

fn project_ring(ring: &Ring, viewport: &Viewport) -> Vec<(i32, i32)> {
    ring.iter().map(|&(lon, lat)| viewport.project(lon, lat)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BoundaryFeature;
    use crate::districts::DistrictTable;
    use crate::marker::MarkerStyle;

    fn setup() -> (MapRenderer, Viewport, MarkerLayer) {
        let background = Rgb::from_u32(0xf5f5f5);
        let renderer = MapRenderer::new(background, BoundaryConfig::default());
        // 100 x 30 cells
        let viewport = Viewport::new(66.0, 28.5, 6.5, 64.0, 200, 120);
        let markers = MarkerLayer::build(&DistrictTable::builtin(), &MarkerStyle::default(), background);
        (renderer, viewport, markers)
    }

    fn square(lon: f64, lat: f64, side: f64) -> BoundaryData {
        BoundaryData {
            features: vec![BoundaryFeature {
                name: Some("Quetta".into()),
                polygons: vec![vec![vec![
                    (lon, lat),
                    (lon + side, lat),
                    (lon + side, lat + side),
                    (lon, lat + side),
                    (lon, lat),
                ]]],
            }],
        }
    }

    #[test]
    fn test_every_marker_rendered_once() {
        let (renderer, viewport, markers) = setup();
        let layers = renderer.render(100, 30, &viewport, &markers);
        assert_eq!(layers.markers.len(), 11);
        let indices: Vec<usize> = layers.markers.iter().map(|g| g.index).collect();
        assert_eq!(indices, (0..11).collect::<Vec<_>>());
        for glyph in &layers.markers {
            assert!(!glyph.cells.is_empty());
            assert_eq!(glyph.count_label, markers.markers()[glyph.index].doctors.to_string());
        }
    }

    #[test]
    fn test_quetta_disc_is_largest() {
        let (renderer, viewport, markers) = setup();
        let layers = renderer.render(100, 30, &viewport, &markers);
        let quetta = layers
            .markers
            .iter()
            .find(|g| markers.markers()[g.index].district == "Quetta")
            .unwrap();
        assert!(layers.markers.iter().all(|g| g.cells.len() <= quetta.cells.len()));
    }

    #[test]
    fn test_boundary_layers_without_data_are_empty() {
        let (renderer, viewport, markers) = setup();
        let layers = renderer.render(100, 30, &viewport, &markers);
        assert_eq!(layers.boundary_fill.lit_count(), 0);
        assert_eq!(layers.boundary_outline.lit_count(), 0);
    }

    #[test]
    fn test_boundary_fill_and_outline() {
        let (mut renderer, viewport, markers) = setup();
        renderer.set_boundary(square(65.0, 28.0, 2.0));
        assert!(renderer.has_boundary());
        let layers = renderer.render(100, 30, &viewport, &markers);
        assert!(layers.boundary_fill.lit_count() > 0);
        assert!(layers.boundary_outline.lit_count() > 0);

        renderer.toggle_boundaries();
        let layers = renderer.render(100, 30, &viewport, &markers);
        assert_eq!(layers.boundary_fill.lit_count(), 0);
    }

    #[test]
    fn test_name_labels_toggle() {
        let (mut renderer, viewport, markers) = setup();
        let layers = renderer.render(100, 30, &viewport, &markers);
        assert!(layers.markers.iter().any(|g| g.name_label.is_some()));

        renderer.toggle_names();
        let layers = renderer.render(100, 30, &viewport, &markers);
        assert!(layers.markers.iter().all(|g| g.name_label.is_none()));
    }

    #[test]
    fn test_translucent_colours() {
        let (renderer, _, _) = setup();
        assert_ne!(renderer.fill_color(), renderer.boundary_style.fill_color);
        assert_ne!(renderer.outline_color(), renderer.background);
    }

    #[test]
    fn test_huge_marker_is_clipped_to_canvas() {
        use crate::marker::SizeScale;

        let (renderer, viewport, _) = setup();
        let style = MarkerStyle {
            size: SizeScale::Continuous {
                min_size: 20.0,
                max_size: 1e7,
            },
            ..MarkerStyle::default()
        };
        let markers = MarkerLayer::build(&DistrictTable::builtin(), &style, renderer.background);
        let layers = renderer.render(100, 30, &viewport, &markers);
        let quetta = layers
            .markers
            .iter()
            .find(|g| markers.markers()[g.index].district == "Quetta")
            .unwrap();
        assert_eq!(quetta.cells.len(), 100 * 30);
    }

    #[test]
    fn test_marker_past_left_edge_keeps_visible_part() {
        let (renderer, _, markers) = setup();
        let quetta = markers.markers().iter().position(|m| m.district == "Quetta").unwrap();
        let (lon, lat) = (markers.markers()[quetta].lon, markers.markers()[quetta].lat);

        // Put Quetta's centre two dots left of the canvas
        let mut viewport = Viewport::new(lon, lat, 6.5, 64.0, 200, 120);
        viewport.pan(102, 0);
        let (px, _) = viewport.project(lon, lat);
        assert!(px < 0 && px > -markers.markers()[quetta].radius_dots());

        let layers = renderer.render(100, 30, &viewport, &markers);
        let glyph = layers.markers.iter().find(|g| g.index == quetta).unwrap();
        assert!(!glyph.cells.is_empty());
        assert!(glyph.cells.iter().all(|&(col, _, _)| col == 0 || col == 1));
        assert_eq!(glyph.center, None);
        assert_eq!(glyph.name_label, None);
    }
}
