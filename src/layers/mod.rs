pub mod coordinator;
pub mod marker;
