pub mod predict;
pub mod validate;
