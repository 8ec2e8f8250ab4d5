mod canvas;

pub use canvas::{BrailleCanvas, EMPTY_CELL};
