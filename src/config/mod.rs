pub mod app_config;
pub mod dataset_config;
pub mod weather_config;

pub use app_config::*;
pub use dataset_config::*;
pub use weather_config::*;
