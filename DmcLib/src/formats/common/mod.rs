//! Common utilities shared by the model and motion formats

mod reader;

#[cfg(test)]
pub(crate) mod test_utils;

pub use reader::BinaryReader;
