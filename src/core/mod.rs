pub mod geo;
pub mod issue;
