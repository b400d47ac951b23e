pub mod pandoc;

use crate::GenerateError;
use crate::parser::Document;

/// Serializes a parsed [`Document`] into a binary document format.
pub trait Generator {
    fn generate(&self, document: &Document) -> Result<Vec<u8>, GenerateError>;
}
