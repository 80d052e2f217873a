pub mod keys;
pub mod tokens;
