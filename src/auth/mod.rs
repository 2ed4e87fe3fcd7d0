pub mod extractor;
pub mod resolver;
