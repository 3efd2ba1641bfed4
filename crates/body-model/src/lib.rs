pub mod blend_shape;
pub mod traits;
pub mod types;

pub use blend_shape::{BlendShapeModel, Modifier};
pub use traits::*;
pub use types::*;
