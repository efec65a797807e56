//! In-memory quote book.

use std::collections::HashMap;

use anyhow::Result;
use async_trait::async_trait;
use chrono::NaiveDate;
use parking_lot::Mutex;
use rust_decimal::Decimal;

use odte_core::market::{occ_underlying, OptionChain, OptionQuote, UnderlyingQuote};
use odte_core::traits::QuoteSource;

/// Quote book backing the paper feed. Symbols map to their latest quote;
/// chains are assembled on demand from the stored option quotes.
#[derive(Default)]
pub struct PaperQuoteBook {
    underlyings: Mutex<HashMap<String, UnderlyingQuote>>,
    options: Mutex<HashMap<String, OptionQuote>>,
}

impl PaperQuoteBook {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_underlying(&self, quote: UnderlyingQuote) {
        assert!(quote.ask >= quote.bid, "crossed underlying quote");
        self.underlyings.lock().insert(quote.symbol.clone(), quote);
    }

    pub fn insert_option(&self, quote: OptionQuote) {
        assert!(quote.ask >= quote.bid, "crossed option quote");
        self.options.lock().insert(quote.symbol.clone(), quote);
    }

    /// Drop one option quote, simulating a feed gap.
    pub fn remove_option(&self, symbol: &str) {
        self.options.lock().remove(symbol);
    }
}

#[async_trait]
impl QuoteSource for PaperQuoteBook {
    async fn underlying_quote(&self, symbol: &str) -> Result<Option<UnderlyingQuote>> {
        Ok(self.underlyings.lock().get(symbol).cloned())
    }

    async fn option_quote(&self, symbol: &str) -> Result<Option<OptionQuote>> {
        Ok(self.options.lock().get(symbol).cloned())
    }

    async fn option_chain(&self, underlying: &str, expiry: NaiveDate) -> Result<OptionChain> {
        let underlying_price = self
            .underlyings
            .lock()
            .get(underlying)
            .map_or(Decimal::ZERO, UnderlyingQuote::mid);

        let quotes: Vec<OptionQuote> = self
            .options
            .lock()
            .values()
            .filter(|q| q.expiry == expiry && occ_underlying(&q.symbol) == Some(underlying))
            .cloned()
            .collect();

        Ok(OptionChain {
            underlying: underlying.to_string(),
            underlying_price,
            expiry: Some(expiry),
            quotes,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use odte_core::market::{occ_symbol, Greeks, OptionRight};
    use rust_decimal_macros::dec;

    fn sample_option(strike: Decimal, expiry: NaiveDate) -> OptionQuote {
        OptionQuote {
            symbol: occ_symbol("SPY", expiry, OptionRight::Call, strike),
            underlying_price: dec!(600),
            strike,
            expiry,
            right: OptionRight::Call,
            bid: dec!(0.75),
            ask: dec!(0.85),
            greeks: Greeks::default(),
            iv: 0.18,
            observed_at: Utc::now(),
        }
    }

    #[tokio::test]
    async fn chain_filters_by_underlying_and_expiry() {
        let book = PaperQuoteBook::new();
        let expiry = NaiveDate::from_ymd_opt(2025, 12, 17).unwrap();
        let other_expiry = NaiveDate::from_ymd_opt(2025, 12, 19).unwrap();
        book.set_underlying(UnderlyingQuote {
            symbol: "SPY".to_string(),
            bid: dec!(599.95),
            ask: dec!(600.05),
        });
        book.insert_option(sample_option(dec!(605), expiry));
        book.insert_option(sample_option(dec!(610), other_expiry));

        let chain = book.option_chain("SPY", expiry).await.unwrap();
        assert_eq!(chain.quotes.len(), 1);
        assert_eq!(chain.underlying_price, dec!(600.00));

        let empty = book.option_chain("QQQ", expiry).await.unwrap();
        assert!(empty.quotes.is_empty());
    }

    #[tokio::test]
    async fn missing_symbols_return_none() {
        let book = PaperQuoteBook::new();
        assert!(book.underlying_quote("SPY").await.unwrap().is_none());
        assert!(book.option_quote("SPY251217C00600000").await.unwrap().is_none());
    }
}
