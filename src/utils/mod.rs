// file: src/utils/mod.rs
// description: utility functions module exports
// reference: internal module structure

pub mod digest;
pub mod http;
pub mod logging;
pub mod validation;

pub use digest::sha256_hex;
pub use validation::Validator;
