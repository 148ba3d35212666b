pub mod fields;
pub mod frame;
