pub mod config;
pub mod error;
pub mod games;
pub mod policy;
pub mod training;
pub mod utils;
pub mod vectorized;
