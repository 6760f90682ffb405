pub mod authentication;

pub use authentication::*;
