#![doc = include_str!("../README.md")]
#![warn(rust_2018_idioms)]

pub mod dh;
pub mod hash;
pub mod kdf;
pub mod key;
pub mod prime;
pub mod request;
pub mod spkac;
pub mod utilities;
pub mod x509;

pub use utilities::error::{Error, ErrorKind, Result};
