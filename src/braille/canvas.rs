/// Braille Unicode canvas for high-resolution terminal graphics.
/// Each character cell represents a 2x4 dot grid (8 dots).
/// Unicode Braille patterns: U+2800 to U+28FF
pub struct BrailleCanvas {
    width: usize,  // Characters
    height: usize, // Characters
    cells: Vec<u8>, // Bit patterns, row-major
}

/// Blank braille pattern
pub const EMPTY_CELL: char = '\u{2800}';

impl BrailleCanvas {
    /// Create a new canvas with the given character dimensions.
    /// Effective dot resolution: width*2 x height*4
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![0u8; width * height],
        }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Bit for a dot within its cell.
    /// ```text
    /// (0,0) (1,0)   bits: 0x01 0x08
    /// (0,1) (1,1)   bits: 0x02 0x10
    /// (0,2) (1,2)   bits: 0x04 0x20
    /// (0,3) (1,3)   bits: 0x40 0x80
    /// ```
    #[inline(always)]
    fn dot_bit(x: usize, y: usize) -> u8 {
        match (x % 2, y % 4) {
            (0, 0) => 0x01,
            (1, 0) => 0x08,
            (0, 1) => 0x02,
            (1, 1) => 0x10,
            (0, 2) => 0x04,
            (1, 2) => 0x20,
            (0, 3) => 0x40,
            (1, 3) => 0x80,
            _ => 0,
        }
    }

    /// Light a dot; out-of-range dots are ignored
    pub fn set_pixel(&mut self, x: usize, y: usize) {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return;
        }
        self.cells[cy * self.width + cx] |= Self::dot_bit(x, y);
    }

    /// Set a dot using signed coordinates (ignores negative values)
    pub fn set_pixel_signed(&mut self, x: i32, y: i32) {
        if x >= 0 && y >= 0 {
            self.set_pixel(x as usize, y as usize);
        }
    }

    pub fn is_set(&self, x: usize, y: usize) -> bool {
        let (cx, cy) = (x / 2, y / 4);
        if cx >= self.width || cy >= self.height {
            return false;
        }
        self.cells[cy * self.width + cx] & Self::dot_bit(x, y) != 0
    }

    pub fn clear(&mut self) {
        self.cells.fill(0);
    }

    /// Braille glyph at a character cell
    pub fn cell(&self, col: usize, row: usize) -> char {
        if col >= self.width || row >= self.height {
            return EMPTY_CELL;
        }
        char::from_u32(0x2800 + self.cells[row * self.width + col] as u32).unwrap_or(EMPTY_CELL)
    }

    /// Non-blank cells as (col, row, glyph)
    pub fn lit_cells(&self) -> impl Iterator<Item = (u16, u16, char)> + '_ {
        self.cells.iter().enumerate().filter_map(move |(idx, &bits)| {
            if bits == 0 {
                return None;
            }
            let col = (idx % self.width) as u16;
            let row = (idx / self.width) as u16;
            Some((col, row, self.cell(col as usize, row as usize)))
        })
    }

    /// Number of non-blank cells
    pub fn lit_count(&self) -> usize {
        self.cells.iter().filter(|&&b| b != 0).count()
    }

    /// Convert the canvas to a string of Braille characters
    #[cfg(test)]
    pub fn to_string(&self) -> String {
        (0..self.height)
            .map(|row| (0..self.width).map(|col| self.cell(col, row)).collect::<String>())
            .collect::<Vec<_>>()
            .join("\n")
    }
}
