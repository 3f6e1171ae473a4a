//! File format handlers for Devil May Cry 3 assets

pub mod common;
pub mod model;
pub mod motion;

pub use common::BinaryReader;
pub use model::{Model, ModelKind, read_model, read_model_file};
pub use motion::{Motion, read_motion, read_motion_file};
