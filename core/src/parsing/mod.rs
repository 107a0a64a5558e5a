pub mod json_schema;
pub mod line_prefix;

pub use json_schema::{JsonExtraction, JsonSchemaParser};
pub use line_prefix::LinePrefixParser;
