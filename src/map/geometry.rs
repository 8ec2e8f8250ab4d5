use crate::braille::BrailleCanvas;

/// 4x4 ordered-dither thresholds, scaled to (0, 1)
const BAYER_4X4: [[f64; 4]; 4] = [
    [0.5 / 16.0, 8.5 / 16.0, 2.5 / 16.0, 10.5 / 16.0],
    [12.5 / 16.0, 4.5 / 16.0, 14.5 / 16.0, 6.5 / 16.0],
    [3.5 / 16.0, 11.5 / 16.0, 1.5 / 16.0, 9.5 / 16.0],
    [15.5 / 16.0, 7.5 / 16.0, 13.5 / 16.0, 5.5 / 16.0],
];

/// Draw a line using Bresenham's algorithm
pub fn draw_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;

    let mut x = x0;
    let mut y = y0;

    loop {
        canvas.set_pixel_signed(x, y);

        if x == x1 && y == y1 {
            break;
        }

        let e2 = 2 * err;

        if e2 >= dy {
            if x == x1 {
                break;
            }
            err += dy;
            x += sx;
        }

        if e2 <= dx {
            if y == y1 {
                break;
            }
            err += dx;
            y += sy;
        }
    }
}

/// Draw a line `width` dots wide (rounded to the nearest whole dot)
pub fn draw_wide_line(canvas: &mut BrailleCanvas, x0: i32, y0: i32, x1: i32, y1: i32, width: f64) {
    draw_line(canvas, x0, y0, x1, y1);
    if width.round() >= 2.0 {
        // Thicken perpendicular to the dominant direction
        if (x1 - x0).abs() >= (y1 - y0).abs() {
            draw_line(canvas, x0, y0 + 1, x1, y1 + 1);
        } else {
            draw_line(canvas, x0 + 1, y0, x1 + 1, y1);
        }
    }
}

/// Draw a filled circle, visiting only the part that lands on the canvas
pub fn draw_circle(canvas: &mut BrailleCanvas, cx: i32, cy: i32, radius: i32) {
    let max_x = (canvas.width() * 2) as i64 - 1;
    let max_y = (canvas.height() * 4) as i64 - 1;
    let (cx, cy, r) = (cx as i64, cy as i64, radius.max(0) as i64);

    for y in (cy - r).max(0)..=(cy + r).min(max_y) {
        let dy = y - cy;
        for x in (cx - r).max(0)..=(cx + r).min(max_x) {
            let dx = x - cx;
            if dx * dx + dy * dy <= r * r {
                canvas.set_pixel(x as usize, y as usize);
            }
        }
    }
}

/// Fill a polygon (exterior ring plus holes) with even-odd scanlines,
/// lighting a share of dots equal to `density` through ordered dithering.
pub fn fill_polygon(canvas: &mut BrailleCanvas, rings: &[Vec<(i32, i32)>], density: f64) {
    if density <= 0.0 || rings.iter().all(|r| r.len() < 3) {
        return;
    }

    let max_y = (canvas.height() * 4) as i32 - 1;
    let max_x = (canvas.width() * 2) as i32 - 1;
    let points = || rings.iter().flatten();
    let top = points().map(|p| p.1).min().unwrap_or(0).max(0);
    let bottom = points().map(|p| p.1).max().unwrap_or(-1).min(max_y);

    let mut crossings: Vec<i32> = Vec::with_capacity(8);
    for y in top..=bottom {
        crossings.clear();
        let scan = y as f64 + 0.5;
        for ring in rings.iter().filter(|r| r.len() >= 3) {
            for (i, &(x0, y0)) in ring.iter().enumerate() {
                let (x1, y1) = ring[(i + 1) % ring.len()];
                let (fy0, fy1) = (y0 as f64, y1 as f64);
                if (fy0 <= scan && fy1 > scan) || (fy1 <= scan && fy0 > scan) {
                    let t = (scan - fy0) / (fy1 - fy0);
                    crossings.push((x0 as f64 + t * (x1 - x0) as f64).round() as i32);
                }
            }
        }
        crossings.sort_unstable();

        for span in crossings.chunks_exact(2) {
            let start = span[0].max(0);
            let end = span[1].min(max_x);
            for x in start..=end {
                if BAYER_4X4[(y & 3) as usize][(x & 3) as usize] < density {
                    canvas.set_pixel_signed(x, y);
                }
            }
        }
    }
}
