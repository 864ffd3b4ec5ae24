pub mod amazon_cleaner;
pub mod attribute_tagger;
pub mod banned_cleaner;
pub mod deduplicator;
pub mod ingredient_filter;
pub mod matcher;
pub mod name_normalizer;
pub mod price_parser;
pub mod skincare_cleaner;

pub use amazon_cleaner::*;
pub use attribute_tagger::*;
pub use banned_cleaner::*;
pub use deduplicator::*;
pub use ingredient_filter::*;
pub use matcher::*;
pub use name_normalizer::*;
pub use price_parser::*;
pub use skincare_cleaner::*;
