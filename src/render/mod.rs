pub mod background;
pub mod composite;
pub(crate) mod paint;
pub mod surface;
pub(crate) mod text;

pub use text::date_stamp_text;
