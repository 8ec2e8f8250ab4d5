use crate::config::AppConfig;
use crate::districts::DistrictTable;
use crate::legend::{Legend, Summary};
use crate::map::{MapHost, MapInstance};
use crate::ui;
use glam::DVec2;
use ratatui::layout::Rect;

/// Application state
pub struct App {
    pub host: MapHost,
    pub legend: Legend,
    pub summary: Summary,
    pub should_quit: bool,
    /// Last mouse position for drag tracking
    pub last_mouse: Option<(u16, u16)>,
    /// Current mouse position for cursor marker
    pub mouse_pos: Option<(u16, u16)>,
    /// Whole terminal area
    screen: Rect,
}

impl App {
    pub fn new(config: AppConfig, table: DistrictTable, width: u16, height: u16) -> Self {
        let host = MapHost::new(config, table);
        let markers = &host.config().markers;
        let legend = Legend::for_style(markers, host.table(), host.config().view.background);
        let summary = Summary::of(host.table());

        let mut app = Self {
            host,
            legend,
            summary,
            should_quit: false,
            last_mouse: None,
            mouse_pos: None,
            screen: Rect::new(0, 0, width, height),
        };
        app.mount();
        app
    }

    /// Canvas rectangle on screen (inside the map border)
    fn canvas_area(&self) -> Rect {
        ui::layout(self.screen).map_inner
    }

    fn mount(&mut self) {
        let canvas = self.canvas_area();
        // Braille gives 2x4 resolution per character
        self.host.mount(canvas.width as usize * 2, canvas.height as usize * 4);
    }

    fn instance_mut(&mut self) -> Option<&mut MapInstance> {
        self.host.instance_mut()
    }

    /// Update viewport size when terminal resizes
    pub fn resize(&mut self, width: u16, height: u16) {
        self.screen = Rect::new(0, 0, width, height);
        let canvas = self.canvas_area();
        if let Some(instance) = self.instance_mut() {
            instance.viewport.width = canvas.width as usize * 2;
            instance.viewport.height = canvas.height as usize * 4;
        }
    }

    /// Per-frame housekeeping: pick up the boundary overlay when it arrives
    pub fn tick(&mut self) {
        if let Some(instance) = self.instance_mut() {
            instance.poll_boundary();
        }
    }

    /// Dispose of the map and build a fresh one at the configured view
    pub fn reset(&mut self) {
        self.host.unmount();
        self.mount();
        self.refresh_hover();
    }

    /// Pan the map
    pub fn pan(&mut self, dx: i32, dy: i32) {
        if let Some(instance) = self.instance_mut() {
            instance.viewport.pan(dx, dy);
        }
        self.refresh_hover();
    }

    pub fn zoom_in(&mut self) {
        if let Some(instance) = self.instance_mut() {
            instance.viewport.zoom_in();
        }
        self.refresh_hover();
    }

    pub fn zoom_out(&mut self) {
        if let Some(instance) = self.instance_mut() {
            instance.viewport.zoom_out();
        }
        self.refresh_hover();
    }

    /// Zoom in towards a screen position (terminal column/row)
    pub fn zoom_in_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.screen_to_dots(col, row) {
            if let Some(instance) = self.instance_mut() {
                instance.viewport.zoom_in_at(px, py);
            }
        }
        self.refresh_hover();
    }

    /// Zoom out from a screen position (terminal column/row)
    pub fn zoom_out_at(&mut self, col: u16, row: u16) {
        if let Some((px, py)) = self.screen_to_dots(col, row) {
            if let Some(instance) = self.instance_mut() {
                instance.viewport.zoom_out_at(px, py);
            }
        }
        self.refresh_hover();
    }

    /// Request quit; the map is released right away
    pub fn quit(&mut self) {
        self.host.unmount();
        self.should_quit = true;
    }

    /// Get current zoom level as a string
    pub fn zoom_level(&self) -> String {
        match self.host.instance() {
            Some(instance) => format!("z{:.1}", instance.viewport.zoom),
            None => "-".to_string(),
        }
    }

    /// Get current center coordinates as a string
    pub fn center_coords(&self) -> String {
        let Some(instance) = self.host.instance() else {
            return String::new();
        };
        let vp = &instance.viewport;
        format!(
            "{:.2}°{}, {:.2}°{}",
            vp.center_lat.abs(),
            if vp.center_lat >= 0.0 { "N" } else { "S" },
            vp.center_lon.abs(),
            if vp.center_lon >= 0.0 { "E" } else { "W" }
        )
    }

    /// Handle mouse drag
    pub fn handle_drag(&mut self, x: u16, y: u16) {
        if let Some((last_x, last_y)) = self.last_mouse {
            // One cell is 2x4 dots
            let dx = (last_x as i32 - x as i32) * 2;
            let dy = (last_y as i32 - y as i32) * 4;
            self.pan(dx, dy);
        }
        self.last_mouse = Some((x, y));
    }

    /// Reset drag state when mouse button released
    pub fn end_drag(&mut self) {
        self.last_mouse = None;
    }

    /// Update mouse cursor position and the hover state it implies
    pub fn set_mouse_pos(&mut self, col: u16, row: u16) {
        self.mouse_pos = Some((col, row));
        self.refresh_hover();
    }

    /// Terminal cell to canvas dot coordinates (cell centre), if over the map
    fn screen_to_dots(&self, col: u16, row: u16) -> Option<(i32, i32)> {
        let canvas = self.canvas_area();
        let inside = col >= canvas.x
            && col < canvas.x + canvas.width
            && row >= canvas.y
            && row < canvas.y + canvas.height;
        inside.then(|| {
            let px = (col - canvas.x) as i32 * 2 + 1;
            let py = (row - canvas.y) as i32 * 4 + 2;
            (px, py)
        })
    }

    /// Re-run hit testing for the current pointer (markers move under a still pointer on pan/zoom)
    fn refresh_hover(&mut self) {
        let pos = self
            .mouse_pos
            .and_then(|(col, row)| self.screen_to_dots(col, row))
            .map(|(px, py)| DVec2::new(px as f64, py as f64));

        if let Some(instance) = self.instance_mut() {
            let viewport = instance.viewport.clone();
            instance.markers.pointer_moved(&viewport, pos);
        }
    }

    /// Screen cell at a district's marker centre, if it is on the map
    pub fn marker_screen_cell(&self, district: &str) -> Option<(u16, u16)> {
        let instance = self.host.instance()?;
        let marker = instance.markers.markers().iter().find(|m| m.district == district)?;
        let (px, py) = instance.viewport.project(marker.lon, marker.lat);
        let canvas = self.canvas_area();
        if px < 0 || py < 0 || px / 2 >= canvas.width as i32 || py / 4 >= canvas.height as i32 {
            return None;
        }
        Some((canvas.x + (px / 2) as u16, canvas.y + (py / 4) as u16))
    }
}
