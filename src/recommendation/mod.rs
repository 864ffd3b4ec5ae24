pub mod category_encoder;
pub mod engine;
pub mod report;
pub mod spf_floor;

pub use category_encoder::*;
pub use engine::*;
pub use report::*;
pub use spf_floor::*;
