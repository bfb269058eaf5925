//! Core data types for datamerge.

pub mod input_file;

pub use input_file::InputFile;
