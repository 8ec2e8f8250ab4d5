//! Terminal map of doctors per district in Balochistan.
//!
//! A braille-rendered map with one marker per district, sized and coloured
//! by doctor count, hover tooltips, an optional district boundary overlay
//! and a legend with totals.

pub mod app;
pub mod braille;
pub mod color;
pub mod config;
pub mod data;
pub mod districts;
pub mod legend;
pub mod map;
pub mod marker;
pub mod tooltip;
pub mod ui;
