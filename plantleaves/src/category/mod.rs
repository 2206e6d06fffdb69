pub mod labels;
pub mod resolver;
