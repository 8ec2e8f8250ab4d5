use crate::color::Rgb;
use crate::districts::DistrictTable;
use crate::marker::{ColorScheme, MarkerStyle, SizeScale, Tier};

/// One legend row
#[derive(Debug, Clone, PartialEq)]
pub struct LegendEntry {
    pub swatch: Rgb,
    /// Glyph drawn in the swatch colour
    pub glyph: char,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Legend {
    pub title: &'static str,
    pub entries: Vec<LegendEntry>,
}

/// Neutral swatch for the size-only tier rows
const TIER_SWATCH: Rgb = Rgb::from_u32(0x6b7280);

/// Glyph for a tier, growing with the tier
fn tier_glyph(tier: Tier) -> char {
    match tier {
        Tier::High => '⬤',
        Tier::Medium => '●',
        Tier::Low => '•',
    }
}

impl Legend {
    /// Legend matching the active marker scheme. Tiered sizing lists the
    /// tiers in a neutral colour, then the colour key of the active colour
    /// scheme, so every marker colour on the map has a row.
    pub fn for_style(style: &MarkerStyle, table: &DistrictTable, background: Rgb) -> Self {
        let colours = colour_entries(style.color, table, background);

        match style.size {
            SizeScale::Tiered { medium_at, large_at, .. } => {
                let mut entries: Vec<LegendEntry> = Tier::ALL
                    .iter()
                    .map(|&tier| {
                        let range = match tier {
                            Tier::High => format!("{large_at}+ doctors"),
                            Tier::Medium => format!("{medium_at}-{} doctors", large_at.saturating_sub(1)),
                            Tier::Low => format!("under {medium_at}"),
                        };
                        LegendEntry {
                            swatch: TIER_SWATCH,
                            glyph: tier_glyph(tier),
                            label: format!("{} ({range})", tier.label()),
                        }
                    })
                    .collect();
                entries.extend(colours);
                Legend {
                    title: "Marker Sizes",
                    entries,
                }
            }
            SizeScale::Continuous { .. } => Legend {
                title: match style.color {
                    ColorScheme::Palette => "District Colors",
                    ColorScheme::OpacityRamp { .. } => "Doctors",
                },
                entries: colours,
            },
        }
    }
}

/// Colour key: one row per district for the palette, one row per distinct
/// doctor count for the ramp
fn colour_entries(scheme: ColorScheme, table: &DistrictTable, background: Rgb) -> Vec<LegendEntry> {
    match scheme {
        ColorScheme::Palette => table
            .records()
            .iter()
            .map(|r| LegendEntry {
                swatch: r.color_or_fallback(),
                glyph: '■',
                label: r.name.clone(),
            })
            .collect(),
        ColorScheme::OpacityRamp { base, min_opacity } => {
            let max = table.max_doctors();
            let mut counts: Vec<u32> = table.records().iter().map(|r| r.doctors).collect();
            counts.sort_unstable();
            counts.dedup();
            counts
                .into_iter()
                .map(|n| LegendEntry {
                    swatch: base.over(background, ColorScheme::opacity_for(n, max, min_opacity)),
                    glyph: '■',
                    label: format!("{n} doctor{}", if n == 1 { "" } else { "s" }),
                })
                .collect()
        }
    }
}

/// Aggregate totals shown under the map
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Summary {
    pub districts: usize,
    pub doctors: u64,
}

impl Summary {
    pub fn of(table: &DistrictTable) -> Self {
        Self {
            districts: table.len(),
            doctors: table.total_doctors(),
        }
    }

    pub fn footer_text(&self) -> String {
        format!("Total Districts: {} | Total Doctors: {}", self.districts, self.doctors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::marker::MarkerLayer;

    const BG: Rgb = Rgb::from_u32(0xf5f5f5);

    #[test]
    fn test_footer_totals() {
        let summary = Summary::of(&DistrictTable::builtin());
        assert_eq!(summary.districts, 11);
        assert_eq!(summary.doctors, 27);
        assert_eq!(summary.footer_text(), "Total Districts: 11 | Total Doctors: 27");
    }

    #[test]
    fn test_palette_legend_lists_every_district() {
        let table = DistrictTable::builtin();
        let legend = Legend::for_style(&MarkerStyle::default(), &table, BG);
        assert_eq!(legend.title, "District Colors");
        assert_eq!(legend.entries.len(), 11);
        for (entry, record) in legend.entries.iter().zip(table.records()) {
            assert_eq!(entry.label, record.name);
            assert_eq!(Some(entry.swatch), record.color);
        }
    }

    #[test]
    fn test_tier_legend() {
        let style = MarkerStyle {
            size: SizeScale::tiered(),
            ..MarkerStyle::default()
        };
        let legend = Legend::for_style(&style, &DistrictTable::builtin(), BG);
        assert_eq!(legend.title, "Marker Sizes");
        let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).take(3).collect();
        assert_eq!(labels, ["high (8+ doctors)", "medium (3-7 doctors)", "low (under 3)"]);
        assert!(legend.entries[..3].iter().all(|e| e.swatch == TIER_SWATCH));
        // District colours follow the tiers
        assert_eq!(legend.entries.len(), 3 + 11);
        assert_eq!(legend.entries[3].label, "Panjgur");
    }

    #[test]
    fn test_ramp_legend_darkens_with_count() {
        let style = MarkerStyle {
            color: ColorScheme::opacity_ramp(),
            ..MarkerStyle::default()
        };
        let legend = Legend::for_style(&style, &DistrictTable::builtin(), BG);
        assert_eq!(legend.title, "Doctors");
        let labels: Vec<&str> = legend.entries.iter().map(|e| e.label.as_str()).collect();
        assert_eq!(labels, ["1 doctor", "2 doctors", "14 doctors"]);
        // Red falls as the blue base gets more opaque
        let reds: Vec<u8> = legend.entries.iter().map(|e| e.swatch.0).collect();
        assert!(reds.windows(2).all(|w| w[0] >= w[1]));
    }

    #[test]
    fn test_every_marker_colour_has_a_legend_row() {
        let table = DistrictTable::builtin();
        for size in [SizeScale::default(), SizeScale::tiered()] {
            for color in [ColorScheme::Palette, ColorScheme::opacity_ramp()] {
                let style = MarkerStyle {
                    size,
                    color,
                    ..MarkerStyle::default()
                };
                let legend = Legend::for_style(&style, &table, BG);
                let layer = MarkerLayer::build(&table, &style, BG);
                for marker in layer.markers() {
                    assert!(
                        legend.entries.iter().any(|e| e.swatch == marker.color),
                        "{} {:?} {:?}",
                        marker.district,
                        size,
                        color
                    );
                }
            }
        }
    }
}
