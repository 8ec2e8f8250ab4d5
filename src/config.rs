use crate::color::Rgb;
use crate::districts::{DistrictRecord, DistrictTable, TableError};
use crate::marker::{ColorScheme, MarkerStyle, SizeScale, MAX_MARKER_SIZE};
use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Top-level configuration. Every section falls back to the built-in map.
#[derive(Debug, Deserialize, Clone, Default)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub view: ViewConfig,
    pub boundary: BoundaryConfig,
    pub markers: MarkerStyle,
    /// Replaces the built-in district table when present
    pub districts: Option<Vec<DistrictRecord>>,
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct ViewConfig {
    pub title: String,
    pub subtitle: String,
    /// (lon, lat)
    pub center: (f64, f64),
    pub zoom: f64,
    /// Braille dots per world tile at zoom 0
    pub tile_size: f64,
    pub background: Rgb,
}

impl Default for ViewConfig {
    fn default() -> Self {
        Self {
            title: "Balochistan District Medical Coverage".to_string(),
            subtitle: "Number of doctors per district".to_string(),
            center: (66.0, 28.5),
            zoom: 6.5,
            tile_size: 64.0,
            background: Rgb::from_u32(0xf5f5f5),
        }
    }
}

#[derive(Debug, Deserialize, Clone, PartialEq)]
#[serde(default, deny_unknown_fields)]
pub struct BoundaryConfig {
    pub enabled: bool,
    pub path: PathBuf,
    pub fill_color: Rgb,
    pub fill_opacity: f64,
    pub line_color: Rgb,
    pub line_width: f64,
    pub line_opacity: f64,
}

impl Default for BoundaryConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            path: PathBuf::from("Balochistan.geojson"),
            fill_color: Rgb::from_u32(0x81c784),
            fill_opacity: 0.4,
            line_color: Rgb::from_u32(0x2d5016),
            line_width: 1.5,
            line_opacity: 0.8,
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {:?}", path))?;
        let config: AppConfig =
            toml::from_str(&content).with_context(|| "Failed to parse TOML configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// District table from config, or the built-in one
    pub fn district_table(&self) -> Result<DistrictTable, TableError> {
        match &self.districts {
            Some(records) => DistrictTable::new(records.clone()),
            None => Ok(DistrictTable::builtin()),
        }
    }

    fn validate(&self) -> Result<()> {
        let (lon, lat) = self.view.center;
        anyhow::ensure!(
            (-180.0..=180.0).contains(&lon) && (-85.0..=85.0).contains(&lat),
            "view.center {:?} is outside the map",
            self.view.center
        );
        anyhow::ensure!(self.view.zoom.is_finite(), "view.zoom must be a finite number");
        anyhow::ensure!(
            self.view.tile_size.is_finite() && self.view.tile_size > 0.0,
            "view.tile_size must be positive"
        );
        for (name, opacity) in [
            ("boundary.fill_opacity", self.boundary.fill_opacity),
            ("boundary.line_opacity", self.boundary.line_opacity),
        ] {
            anyhow::ensure!((0.0..=1.0).contains(&opacity), "{name} must be within 0..=1");
        }
        match self.markers.size {
            SizeScale::Continuous { min_size, max_size } => {
                anyhow::ensure!(
                    0.0 < min_size && min_size <= max_size && max_size <= MAX_MARKER_SIZE,
                    "markers.size needs 0 < min_size <= max_size <= {MAX_MARKER_SIZE}"
                );
            }
            SizeScale::Tiered {
                medium_at,
                large_at,
                small_size,
                medium_size,
                large_size,
            } => {
                anyhow::ensure!(medium_at <= large_at, "markers.size needs medium_at <= large_at");
                anyhow::ensure!(
                    0.0 < small_size
                        && small_size <= medium_size
                        && medium_size <= large_size
                        && large_size <= MAX_MARKER_SIZE,
                    "markers.size needs 0 < small_size <= medium_size <= large_size <= {MAX_MARKER_SIZE}"
                );
            }
        }
        if let ColorScheme::OpacityRamp { min_opacity, .. } = self.markers.color {
            anyhow::ensure!((0.0..=1.0).contains(&min_opacity), "markers.color.min_opacity must be within 0..=1");
        }
        self.district_table().context("invalid [[districts]] table")?;
        Ok(())
    }
}
