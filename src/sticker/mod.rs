pub mod engine;
pub mod hit;
pub mod model;
