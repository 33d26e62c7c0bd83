//! CSV dataset loading and validation for grove.

mod error;
mod reader;

pub use error::IoError;
pub use reader::ExampleReader;
