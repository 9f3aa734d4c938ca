//! Domain types for PriceCast

pub mod chart;
pub mod series;

pub use chart::{ChartData, LabeledSeries};
pub use series::{DatedPrice, PriceSeries, WindowRequest};

/// Symbol type alias
pub type Symbol = String;

/// Longest accepted ticker.
pub const MAX_SYMBOL_LEN: usize = 16;

/// Characters a ticker may contain after upper-casing: `BRK.B`, `BTC-USD`,
/// `^GSPC`, `EURUSD=X`.
pub fn is_symbol_char(c: char) -> bool {
    c.is_ascii_uppercase() || c.is_ascii_digit() || matches!(c, '.' | '-' | '^' | '=')
}

/// Trim and upper-case a user-typed ticker.
///
/// The result is used as a URL path segment and a cache directory name, so
/// anything outside [`is_symbol_char`], a `..` run, or more than
/// [`MAX_SYMBOL_LEN`] characters is rejected.
pub fn normalize_symbol(raw: &str) -> crate::error::Result<Symbol> {
    let invalid = |msg: String| Err(crate::error::PricecastError::InvalidParameter(msg));
    let symbol = raw.trim().to_uppercase();
    if symbol.is_empty() {
        return invalid("symbol must not be empty".into());
    }
    if let Some(bad) = symbol.chars().find(|c| !is_symbol_char(*c)) {
        return invalid(format!("symbol '{symbol}' contains invalid character {bad:?}"));
    }
    if symbol.contains("..") {
        return invalid(format!("symbol '{symbol}' is not a ticker"));
    }
    if symbol.chars().count() > MAX_SYMBOL_LEN {
        return invalid(format!(
            "symbol '{symbol}' is longer than {MAX_SYMBOL_LEN} characters"
        ));
    }
    Ok(symbol)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_symbol() {
        assert_eq!(normalize_symbol("  aapl ").unwrap(), "AAPL");
        assert_eq!(normalize_symbol("btc-usd").unwrap(), "BTC-USD");
        assert!(normalize_symbol("   ").is_err());
    }

    #[test]
    fn accepts_index_and_currency_tickers() {
        for ok in ["^gspc", "eurusd=x", "brk.b", "7203.T"] {
            assert!(normalize_symbol(ok).is_ok(), "{ok}");
        }
    }

    #[test]
    fn rejects_path_and_query_characters() {
        for bad in ["../etc", "A/B", "SPY?x=1", "SPY#frag", "A B", "a\\b", "..", "%2F"] {
            assert!(
                matches!(
                    normalize_symbol(bad),
                    Err(crate::error::PricecastError::InvalidParameter(_))
                ),
                "{bad}"
            );
        }
        assert!(normalize_symbol(&"A".repeat(MAX_SYMBOL_LEN + 1)).is_err());
    }
}
