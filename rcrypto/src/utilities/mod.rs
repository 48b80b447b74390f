pub(crate) mod encoding;
pub mod error;
pub(crate) mod rand;
