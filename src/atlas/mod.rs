//! Genre taxonomy loading and modeling, independent of the GUI layer.

pub mod load;
pub mod model;

pub use load::load_atlas;
pub use model::{GenreAtlas, GenreFeatures, GenreLink, GenreNode, Rgb};
