pub mod angle;
pub mod artifact;
pub mod common;
pub mod gemini;
pub mod image;
pub mod request;

pub use angle::*;
pub use artifact::*;
pub use common::*;
pub use image::*;
pub use request::*;
