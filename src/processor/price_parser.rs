use std::str::FromStr;
use thiserror::Error;
use unicode_normalization::UnicodeNormalization;

const CURRENCY_SYMBOLS: [char; 4] = ['$', '€', '£', '₹'];

#[derive(Debug, Clone, PartialEq, Error)]
#[error("unparsable price: {0:?}")]
pub struct PriceParseError(pub String);

/// Parses listing price text such as `"$1,299.00"` into a number.
///
/// Currency symbols, thousands separators and surrounding whitespace are
/// stripped; whatever remains must be a finite float. Full-width digits and
/// symbols are folded to ASCII first.
pub fn parse_price(text: &str) -> Result<f64, PriceParseError> {
    let cleaned: String = text
        .nfkc()
        .filter(|c| !CURRENCY_SYMBOLS.contains(c) && *c != ',')
        .collect();

    match f64::from_str(cleaned.trim()) {
        Ok(value) if value.is_finite() => Ok(value),
        _ => Err(PriceParseError(text.to_string())),
    }
}

/// Lenient numeric coercion used while cleaning: blank or junk becomes `None`.
pub fn coerce_number(text: &str) -> Option<f64> {
    let folded: String = text.nfkc().collect();
    f64::from_str(folded.trim()).ok().filter(|v| v.is_finite())
}
