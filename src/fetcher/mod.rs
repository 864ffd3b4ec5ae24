pub mod weather_fetcher;

pub use weather_fetcher::*;
