pub mod crop;
pub mod pipeline;
