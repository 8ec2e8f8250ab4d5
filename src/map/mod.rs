mod geometry;
mod host;
mod projection;
mod renderer;

pub use host::{BoundaryStatus, MapHost, MapInstance};
pub use projection::Viewport;
pub use renderer::{MapLayers, MapRenderer, MarkerGlyph};
