//! Image payload encoding for model requests.

pub mod encoder;

pub use encoder::{EncodedImage, EncodingError};
