use crate::color::Rgb;
use crate::districts::{DistrictRecord, DistrictTable};
use crate::map::Viewport;
use crate::tooltip::{tooltip_lines, HoverState, HoverTracker, PointerEvent};
use glam::DVec2;
use serde::Deserialize;
use tracing::{debug, warn};

/// Screen pixels represented by one braille dot when converting marker sizes
pub const PX_PER_DOT: f64 = 8.0;

/// Largest marker diameter a configuration may ask for, in screen pixels
pub const MAX_MARKER_SIZE: f64 = 400.0;

/// Discrete size bucket
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Tier {
    Low,
    Medium,
    High,
}

impl Tier {
    pub const ALL: [Tier; 3] = [Tier::High, Tier::Medium, Tier::Low];

    pub fn label(self) -> &'static str {
        match self {
            Tier::Low => "low",
            Tier::Medium => "medium",
            Tier::High => "high",
        }
    }
}

fn default_min_size() -> f64 {
    20.0
}
fn default_max_size() -> f64 {
    80.0
}
fn default_medium_at() -> u32 {
    3
}
fn default_large_at() -> u32 {
    8
}
fn default_small_size() -> f64 {
    24.0
}
fn default_medium_size() -> f64 {
    48.0
}
fn default_large_size() -> f64 {
    80.0
}
fn default_ramp_base() -> Rgb {
    Rgb::from_u32(0x2563eb)
}
fn default_min_opacity() -> f64 {
    0.25
}

/// How marker pixel size is derived from a doctor count
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(tag = "scheme", rename_all = "kebab-case", deny_unknown_fields)]
pub enum SizeScale {
    /// Linear interpolation between `min_size` and `max_size` by `doctors / max`
    Continuous {
        #[serde(default = "default_min_size")]
        min_size: f64,
        #[serde(default = "default_max_size")]
        max_size: f64,
    },
    /// Fixed breakpoints: `>= large_at` high, `>= medium_at` medium, else low
    Tiered {
        #[serde(default = "default_medium_at")]
        medium_at: u32,
        #[serde(default = "default_large_at")]
        large_at: u32,
        #[serde(default = "default_small_size")]
        small_size: f64,
        #[serde(default = "default_medium_size")]
        medium_size: f64,
        #[serde(default = "default_large_size")]
        large_size: f64,
    },
}

impl Default for SizeScale {
    fn default() -> Self {
        SizeScale::Continuous {
            min_size: default_min_size(),
            max_size: default_max_size(),
        }
    }
}

impl SizeScale {
    pub fn tiered() -> Self {
        SizeScale::Tiered {
            medium_at: default_medium_at(),
            large_at: default_large_at(),
            small_size: default_small_size(),
            medium_size: default_medium_size(),
            large_size: default_large_size(),
        }
    }

    /// Tier for a count; `None` for the continuous scale
    pub fn tier(&self, doctors: u32) -> Option<Tier> {
        match *self {
            SizeScale::Continuous { .. } => None,
            SizeScale::Tiered { medium_at, large_at, .. } => Some(if doctors >= large_at {
                Tier::High
            } else if doctors >= medium_at {
                Tier::Medium
            } else {
                Tier::Low
            }),
        }
    }

    /// Marker diameter in screen pixels
    pub fn size_for(&self, doctors: u32, max_doctors: u32) -> f64 {
        match *self {
            SizeScale::Continuous { min_size, max_size } => {
                if max_doctors == 0 {
                    return min_size;
                }
                let ratio = (doctors as f64 / max_doctors as f64).min(1.0);
                min_size + ratio * (max_size - min_size)
            }
            SizeScale::Tiered {
                small_size,
                medium_size,
                large_size,
                ..
            } => match self.tier(doctors) {
                Some(Tier::High) => large_size,
                Some(Tier::Medium) => medium_size,
                _ => small_size,
            },
        }
    }

    /// Upper bound of `size_for`
    pub fn max_size(&self) -> f64 {
        match *self {
            SizeScale::Continuous { max_size, .. } => max_size,
            SizeScale::Tiered { large_size, .. } => large_size,
        }
    }
}

/// How marker fill colour is chosen
#[derive(Debug, Clone, Copy, PartialEq, Default, Deserialize)]
#[serde(tag = "scheme", rename_all = "kebab-case", deny_unknown_fields)]
pub enum ColorScheme {
    /// Each district's own colour, fallback when unassigned
    #[default]
    Palette,
    /// One base colour over the background, opacity `doctors / max`
    OpacityRamp {
        #[serde(default = "default_ramp_base")]
        base: Rgb,
        /// Floor so single-doctor districts stay visible
        #[serde(default = "default_min_opacity")]
        min_opacity: f64,
    },
}

impl ColorScheme {
    pub fn opacity_ramp() -> Self {
        ColorScheme::OpacityRamp {
            base: default_ramp_base(),
            min_opacity: default_min_opacity(),
        }
    }

    pub fn opacity_for(doctors: u32, max_doctors: u32, min_opacity: f64) -> f64 {
        let ratio = if max_doctors == 0 {
            0.0
        } else {
            (doctors as f64 / max_doctors as f64).min(1.0)
        };
        ratio.max(min_opacity)
    }

    pub fn color_for(&self, record: &DistrictRecord, max_doctors: u32, background: Rgb) -> Rgb {
        match *self {
            ColorScheme::Palette => record.color_or_fallback(),
            ColorScheme::OpacityRamp { base, min_opacity } => {
                base.over(background, Self::opacity_for(record.doctors, max_doctors, min_opacity))
            }
        }
    }
}

/// Marker appearance settings (`[markers]` in the config file)
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct MarkerStyle {
    pub size: SizeScale,
    pub color: ColorScheme,
    /// Draw the district name above each marker
    pub show_names: bool,
}

impl Default for MarkerStyle {
    fn default() -> Self {
        Self {
            size: SizeScale::default(),
            color: ColorScheme::default(),
            show_names: true,
        }
    }
}

/// One district marker
#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub district: String,
    pub doctors: u32,
    pub lon: f64,
    pub lat: f64,
    pub size_px: f64,
    pub color: Rgb,
    pub tier: Option<Tier>,
    pub hover: HoverState,
}

impl Marker {
    /// Disc radius in braille dots
    pub fn radius_dots(&self) -> i32 {
        (self.size_px / (2.0 * PX_PER_DOT)).round() as i32
    }

    /// Text drawn inside the marker
    pub fn count_label(&self) -> String {
        self.doctors.to_string()
    }

    pub fn tooltip_lines(&self) -> [String; 2] {
        tooltip_lines(&self.district, self.doctors)
    }

    /// Tooltip offset above the marker centre, in braille dots
    pub fn tooltip_offset_dots(&self) -> i32 {
        ((self.size_px / 2.0 + 10.0) / PX_PER_DOT).round() as i32
    }

    /// Whether a dot-space position falls on the marker, with one cell of slack
    pub fn contains(&self, viewport: &Viewport, pos: DVec2) -> bool {
        let center = viewport.project_f(self.lon, self.lat);
        let r = self.radius_dots() as f64;
        let reach = DVec2::new(r + 2.0, r + 4.0);
        ((pos - center) / reach).length_squared() <= 1.0
    }
}

/// All markers for one mount, in table order
#[derive(Debug, Clone, Default)]
pub struct MarkerLayer {
    markers: Vec<Marker>,
    skipped: Vec<String>,
    tracker: HoverTracker,
}

impl MarkerLayer {
    /// Build markers for every district with a coordinate; others are skipped with a warning
    pub fn build(table: &DistrictTable, style: &MarkerStyle, background: Rgb) -> Self {
        let max_doctors = table.max_doctors();
        let mut markers = Vec::with_capacity(table.len());
        let mut skipped = Vec::new();

        for record in table.records() {
            let Some((lon, lat)) = record.coordinate else {
                warn!(district = %record.name, "no coordinate for district, marker skipped");
                skipped.push(record.name.clone());
                continue;
            };
            markers.push(Marker {
                district: record.name.clone(),
                doctors: record.doctors,
                lon,
                lat,
                size_px: style.size.size_for(record.doctors, max_doctors),
                color: style.color.color_for(record, max_doctors, background),
                tier: style.size.tier(record.doctors),
                hover: HoverState::Hidden,
            });
        }

        debug!(markers = markers.len(), skipped = skipped.len(), "marker layer built");
        Self {
            markers,
            skipped,
            tracker: HoverTracker::default(),
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    /// Districts left out for lack of a coordinate
    pub fn skipped(&self) -> &[String] {
        &self.skipped
    }

    pub fn len(&self) -> usize {
        self.markers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.markers.is_empty()
    }

    /// Topmost marker under a dot-space position (later markers draw on top)
    pub fn hit_test(&self, viewport: &Viewport, pos: DVec2) -> Option<usize> {
        self.markers.iter().rposition(|m| m.contains(viewport, pos))
    }

    /// Pointer moved to `pos` (dot space), or left the map when `None`
    pub fn pointer_moved(&mut self, viewport: &Viewport, pos: Option<DVec2>) {
        let hit = pos.and_then(|p| self.hit_test(viewport, p));
        for (idx, event) in self.tracker.update(hit) {
            self.apply(idx, event);
        }
    }

    fn apply(&mut self, idx: usize, event: PointerEvent) {
        if let Some(marker) = self.markers.get_mut(idx) {
            marker.hover = marker.hover.on(event);
        }
    }

    /// Marker whose tooltip is showing
    pub fn shown(&self) -> Option<&Marker> {
        self.tracker
            .hovered()
            .and_then(|idx| self.markers.get(idx))
            .filter(|m| m.hover.is_shown())
    }
}
