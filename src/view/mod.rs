pub mod bootstrap;
pub mod controller;
