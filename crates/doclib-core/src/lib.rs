#![deny(warnings)]
#![deny(dead_code)]
#![deny(unused_variables)]
#![deny(unused_imports)]

pub mod config;
#[cfg(feature = "docx")]
pub mod docx;
pub mod error;
pub mod scanner;
pub mod tokenize;
pub mod traits;
pub mod types;

pub use error::{Error, Result};
