pub mod data_models;
pub mod profile;

pub use data_models::*;
pub use profile::*;
