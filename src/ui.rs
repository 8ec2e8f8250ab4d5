use crate::app::App;
use crate::braille::BrailleCanvas;
use crate::color::Rgb;
use crate::map::{MapLayers, MapRenderer};
use crate::marker::Marker;
use ratatui::{
    buffer::Buffer,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Clear, Paragraph, Widget},
    Frame,
};

const LEGEND_WIDTH: u16 = 26;
const TEXT_DARK: Rgb = Rgb::from_u32(0x1f2937);

/// Screen regions, shared by rendering and pointer hit testing
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Areas {
    pub header: Rect,
    pub legend: Rect,
    pub map: Rect,
    /// Map area inside its border, where the canvas lives
    pub map_inner: Rect,
    pub footer: Rect,
    pub status: Rect,
}

pub fn layout(area: Rect) -> Areas {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2), // Title + subtitle
            Constraint::Min(5),    // Legend + map
            Constraint::Length(1), // Totals
            Constraint::Length(1), // Status bar
        ])
        .split(area);

    let body = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(LEGEND_WIDTH), Constraint::Min(10)])
        .split(rows[1]);

    Areas {
        header: rows[0],
        legend: body[0],
        map: body[1],
        map_inner: Block::default().borders(Borders::ALL).inner(body[1]),
        footer: rows[2],
        status: rows[3],
    }
}

/// Render the UI
pub fn render(frame: &mut Frame, app: &App) {
    let areas = layout(frame.area());

    render_header(frame, app, areas.header);
    render_legend(frame, app, areas.legend);
    render_map(frame, app, areas.map);
    render_footer(frame, app, areas.footer);
    render_status_bar(frame, app, areas.status);
}

fn render_header(frame: &mut Frame, app: &App, area: Rect) {
    let view = &app.host.config().view;
    let header = Paragraph::new(vec![
        Line::from(Span::styled(
            format!(" {}", view.title),
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        )),
        Line::from(Span::styled(format!(" {}", view.subtitle), Style::default().fg(Color::Gray))),
    ]);
    frame.render_widget(header, area);
}

fn render_legend(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            format!(" {} ", app.legend.title),
            Style::default().add_modifier(Modifier::BOLD),
        ));

    let lines: Vec<Line> = app
        .legend
        .entries
        .iter()
        .map(|entry| {
            Line::from(vec![
                Span::styled(format!(" {} ", entry.glyph), Style::default().fg(entry.swatch.into())),
                Span::raw(entry.label.clone()),
            ])
        })
        .collect();

    frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_map(frame: &mut Frame, app: &App, area: Rect) {
    let block = Block::default()
        .borders(Borders::ALL)
        .border_style(Style::default().fg(Color::DarkGray))
        .title(Span::styled(
            " Map ",
            Style::default().fg(Color::Cyan).add_modifier(Modifier::BOLD),
        ));

    let inner = block.inner(area);
    frame.render_widget(block, area);

    let Some(instance) = app.host.instance() else {
        return;
    };

    // Braille gives 2x4 resolution per character
    let mut viewport = instance.viewport.clone();
    viewport.width = inner.width as usize * 2;
    viewport.height = inner.height as usize * 4;

    let layers = instance
        .renderer
        .render(inner.width as usize, inner.height as usize, &viewport, &instance.markers);

    // Cursor cell relative to the canvas
    let cursor_pos = app.mouse_pos.and_then(|(col, row)| {
        let inside = col >= inner.x && col < inner.x + inner.width && row >= inner.y && row < inner.y + inner.height;
        inside.then(|| (col - inner.x, row - inner.y))
    });

    let markers_visible = instance.renderer.settings.show_markers;
    let tooltip = instance.markers.shown().filter(|_| markers_visible).map(|marker| {
        let (px, py) = viewport.project(marker.lon, marker.lat);
        Tooltip::new(marker, px, py)
    });

    let map_widget = MapWidget {
        layers,
        renderer: &instance.renderer,
        tooltip,
        cursor_pos,
    };
    frame.render_widget(map_widget, inner);
}

/// Hover popup anchored above a marker
struct Tooltip {
    lines: [String; 2],
    /// Anchor cell (marker centre column, row above the marker)
    col: i32,
    row: i32,
}

impl Tooltip {
    fn new(marker: &Marker, px: i32, py: i32) -> Self {
        Self {
            lines: marker.tooltip_lines(),
            col: px / 2,
            row: (py - marker.tooltip_offset_dots()) / 4,
        }
    }

    /// Popup rectangle inside `area`, sitting above the anchor when there is room
    fn rect(&self, area: Rect) -> Rect {
        let text_width = self.lines.iter().map(|l| l.chars().count()).max().unwrap_or(0) as u16;
        let width = (text_width + 4).min(area.width);
        let height = 4u16.min(area.height);

        let left = (self.col - width as i32 / 2).clamp(0, (area.width - width) as i32) as u16;
        let top = if self.row - height as i32 >= 0 {
            (self.row - height as i32) as u16
        } else {
            // Not enough room above: drop below the anchor
            ((self.row + 2).max(0) as u16).min(area.height - height)
        };

        Rect::new(area.x + left, area.y + top, width, height)
    }
}

/// Custom widget that renders the braille map with markers and labels overlaid
struct MapWidget<'a> {
    layers: MapLayers,
    renderer: &'a MapRenderer,
    tooltip: Option<Tooltip>,
    cursor_pos: Option<(u16, u16)>,
}

impl MapWidget<'_> {
    /// Render a braille canvas layer with a specific color
    fn render_layer(&self, canvas: &BrailleCanvas, color: Color, area: Rect, buf: &mut Buffer) {
        draw_cells(canvas.lit_cells(), color, area, buf);
    }

    /// Write text starting at a canvas cell, clipped to the area
    fn put_text(&self, col: u16, row: u16, text: &str, style: Style, area: Rect, buf: &mut Buffer) {
        if row >= area.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let x = col as usize + i;
            if x >= area.width as usize {
                break;
            }
            buf[(area.x + x as u16, area.y + row)].set_char(ch).set_style(style);
        }
    }
}

impl Widget for MapWidget<'_> {
    fn render(self, area: Rect, buf: &mut Buffer) {
        // 1. Flat background
        let background: Color = self.renderer.background.into();
        buf.set_style(area, Style::default().bg(background));

        // 2. Boundary fill, then outline on top
        self.render_layer(&self.layers.boundary_fill, self.renderer.fill_color().into(), area, buf);
        self.render_layer(&self.layers.boundary_outline, self.renderer.outline_color().into(), area, buf);

        // 3. Markers in table order, each with its count and name
        let name_style = Style::default().fg(TEXT_DARK.into()).add_modifier(Modifier::BOLD);
        for glyph in &self.layers.markers {
            draw_cells(glyph.cells.iter().copied(), glyph.color.into(), area, buf);

            if let Some((center_col, center_row)) = glyph.center {
                let label_style = Style::default()
                    .fg(glyph.color.contrast_text().into())
                    .bg(glyph.color.into())
                    .add_modifier(Modifier::BOLD);
                let label_len = glyph.count_label.chars().count() as u16;
                let col = center_col.saturating_sub(label_len / 2);
                self.put_text(col, center_row, &glyph.count_label, label_style, area, buf);
            }

            if let Some((col, row, name)) = &glyph.name_label {
                self.put_text(*col, *row, name, name_style, area, buf);
            }
        }

        // 4. Tooltip for the hovered marker
        if let Some(tooltip) = &self.tooltip {
            if area.width >= 6 && area.height >= 4 {
                let rect = tooltip.rect(area);
                let [name, count] = &tooltip.lines;
                let popup = Paragraph::new(vec![
                    Line::from(Span::styled(name.clone(), Style::default().add_modifier(Modifier::BOLD))),
                    Line::from(count.clone()),
                ])
                .style(Style::default().fg(TEXT_DARK.into()).bg(Color::White))
                .block(
                    Block::default()
                        .borders(Borders::ALL)
                        .border_style(Style::default().fg(Color::DarkGray)),
                );
                Clear.render(rect, buf);
                popup.render(rect, buf);
            }
        }

        // Render cursor marker
        if let Some((cx, cy)) = self.cursor_pos {
            if cx < area.width && cy < area.height && self.tooltip.is_none() {
                buf[(area.x + cx, area.y + cy)].set_char('╋').set_fg(Color::Red);
            }
        }
    }
}

fn draw_cells(cells: impl Iterator<Item = (u16, u16, char)>, color: Color, area: Rect, buf: &mut Buffer) {
    for (col, row, ch) in cells {
        if col >= area.width || row >= area.height {
            continue;
        }
        buf[(area.x + col, area.y + row)].set_char(ch).set_fg(color);
    }
}

fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let footer = Paragraph::new(Line::from(Span::styled(
        format!(" {}", app.summary.footer_text()),
        Style::default().fg(Color::Gray),
    )));
    frame.render_widget(footer, area);
}

fn render_status_bar(frame: &mut Frame, app: &App, area: Rect) {
    let Some(instance) = app.host.instance() else {
        return;
    };
    let settings = &instance.renderer.settings;
    let toggle = |on: bool, on_text: &'static str, off_text: &'static str| {
        Span::styled(
            if on { on_text } else { off_text },
            Style::default().fg(if on { Color::Green } else { Color::DarkGray }),
        )
    };

    let status = Line::from(vec![
        Span::styled(" Zoom: ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.zoom_level(), Style::default().fg(Color::Yellow)),
        Span::styled(" | Boundaries: ", Style::default().fg(Color::DarkGray)),
        Span::styled(instance.boundary_status().label(), Style::default().fg(Color::Magenta)),
        Span::styled(
            match instance.unmatched_districts().len() {
                0 => String::new(),
                n => format!(" ({n} unmatched)"),
            },
            Style::default().fg(Color::DarkGray),
        ),
        Span::styled(" | ", Style::default().fg(Color::DarkGray)),
        toggle(settings.show_boundaries, "[B]oundary ", "[b]oundary "),
        toggle(settings.show_markers, "[M]arkers ", "[m]arkers "),
        toggle(settings.show_names, "[N]ames ", "[n]ames "),
        Span::styled("| ", Style::default().fg(Color::DarkGray)),
        Span::styled(app.center_coords(), Style::default().fg(Color::Cyan)),
        Span::styled(
            " | hjkl:pan +/-:zoom r:reset q:quit",
            Style::default().fg(Color::DarkGray),
        ),
    ]);

    frame.render_widget(Paragraph::new(status), area);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::districts::DistrictTable;
    use ratatui::backend::TestBackend;
    use ratatui::Terminal;

    fn config_without_boundary() -> AppConfig {
        let mut config = AppConfig::default();
        config.boundary.enabled = false;
        config
    }

    fn buffer_text(buf: &Buffer) -> String {
        let area = buf.area;
        (0..area.height)
            .map(|y| (0..area.width).map(|x| buf[(x, y)].symbol()).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn draw(app: &App, width: u16, height: u16) -> String {
        let mut terminal = Terminal::new(TestBackend::new(width, height)).unwrap();
        terminal.draw(|frame| render(frame, app)).unwrap();
        buffer_text(terminal.backend().buffer())
    }

    #[test]
    fn test_layout_regions() {
        let areas = layout(Rect::new(0, 0, 120, 40));
        assert_eq!(areas.header.height, 2);
        assert_eq!(areas.footer.y, 38);
        assert_eq!(areas.status.y, 39);
        assert_eq!(areas.legend.width, LEGEND_WIDTH);
        assert_eq!(areas.map_inner, Rect::new(LEGEND_WIDTH + 1, 3, 120 - LEGEND_WIDTH - 2, 34));
    }

    #[test]
    fn test_screen_shows_header_legend_and_footer() {
        let app = App::new(config_without_boundary(), DistrictTable::builtin(), 140, 44);
        let text = draw(&app, 140, 44);
        assert!(text.contains("Balochistan District Medical Coverage"));
        assert!(text.contains("Number of doctors per district"));
        assert!(text.contains("District Colors"));
        assert!(text.contains("Dera Murad Jamali"));
        assert!(text.contains("Total Districts: 11 | Total Doctors: 27"));
        assert!(text.contains("14"));
    }

    #[test]
    fn test_hover_draws_tooltip() {
        let mut app = App::new(config_without_boundary(), DistrictTable::builtin(), 140, 44);
        let text = draw(&app, 140, 44);
        assert!(!text.contains("Doctors: 14"));

        let (col, row) = app.marker_screen_cell("Quetta").unwrap();
        app.set_mouse_pos(col, row);
        let text = draw(&app, 140, 44);
        assert!(text.contains("Quetta"));
        assert!(text.contains("Doctors: 14"));

        app.set_mouse_pos(0, 0);
        let text = draw(&app, 140, 44);
        assert!(!text.contains("Doctors: 14"));
    }
}
