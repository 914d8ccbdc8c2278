//! Grayscale image container and border handling.

mod border;
mod gray;

pub(crate) use border::reflect_101;
pub use gray::GrayImage;
