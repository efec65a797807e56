//! 0DTE iron condor assembly.
//!
//! Sells an OTM call spread and an OTM put spread simultaneously for
//! credit, with protection strikes one width beyond each short strike.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use chrono_tz::US::Eastern;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use odte_core::market::{occ_symbol, OptionRight, OrderSide};
use odte_core::order::{MultiLegOrder, OptionLeg, SpreadStrategy};
use odte_core::traits::QuoteSource;

use crate::selector::find_quote_by_delta;
use crate::SpreadError;

/// Short strikes target roughly 15% ITM probability.
pub const TARGET_DELTA: f64 = 0.15;
/// Accept anything from 0.10 to 0.20 delta.
pub const DELTA_TOLERANCE: f64 = 0.05;
/// Protection strikes sit $5 beyond each short strike (SPY/QQQ widths).
pub const SPREAD_WIDTH: Decimal = dec!(5.00);
/// Minimum credit per vertical spread.
pub const MIN_CREDIT_PER_SPREAD: Decimal = dec!(0.50);

const fn hm(hour: u32, minute: u32) -> NaiveTime {
    match NaiveTime::from_hms_opt(hour, minute, 0) {
        Some(t) => t,
        None => panic!("invalid time literal"),
    }
}

/// Entry window opens one minute after the bell.
pub const ENTRY_WINDOW_START: NaiveTime = hm(9, 31);
pub const ENTRY_WINDOW_END: NaiveTime = hm(9, 45);

/// A fully-priced iron condor ready for sizing and execution.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IronCondorSetup {
    pub underlying: String,
    pub short_call_strike: Decimal,
    pub long_call_strike: Decimal,
    pub short_put_strike: Decimal,
    pub long_put_strike: Decimal,
    pub quantity: u32,
    pub call_spread_credit: Decimal,
    pub put_spread_credit: Decimal,
    pub total_credit: Decimal,
    pub max_profit: Decimal,
    pub max_loss_per_side: Decimal,
    pub expiry: NaiveDate,
    pub dte: i64,
    pub entry_time: DateTime<Utc>,
    pub underlying_price_at_entry: Decimal,
    /// Chain mids at selection time, reused as leg limit prices so the
    /// order's signed credit matches `total_credit`.
    pub short_call_mid: Decimal,
    pub long_call_mid: Decimal,
    pub short_put_mid: Decimal,
    pub long_put_mid: Decimal,
}

/// True while the exchange-local clock is inside the condor entry window
/// (9:31–9:45 ET, the first minutes after the open).
#[must_use]
pub fn in_entry_window(now: DateTime<Utc>) -> bool {
    let now_et = now.with_timezone(&Eastern).time();
    (ENTRY_WINDOW_START..=ENTRY_WINDOW_END).contains(&now_et)
}

/// Select strikes and price a condor off the live chain.
pub async fn build_iron_condor(
    quotes: &dyn QuoteSource,
    underlying: &str,
    expiry: NaiveDate,
    quantity: u32,
    now: DateTime<Utc>,
) -> Result<IronCondorSetup, SpreadError> {
    let underlying_quote = quotes
        .underlying_quote(underlying)
        .await?
        .ok_or_else(|| SpreadError::NoUnderlyingPrice {
            symbol: underlying.to_string(),
        })?;
    let underlying_price = underlying_quote.mid();

    info!(
        underlying,
        price = %underlying_price,
        %expiry,
        "Building iron condor"
    );

    let chain = quotes.option_chain(underlying, expiry).await?;

    let short_call =
        find_quote_by_delta(&chain, OptionRight::Call, TARGET_DELTA, DELTA_TOLERANCE)?.clone();
    let long_call_strike = short_call.strike + SPREAD_WIDTH;
    let long_call = chain
        .at_strike(OptionRight::Call, long_call_strike)
        .ok_or_else(|| SpreadError::MissingQuote {
            symbol: occ_symbol(underlying, expiry, OptionRight::Call, long_call_strike),
        })?
        .clone();

    let short_put =
        find_quote_by_delta(&chain, OptionRight::Put, TARGET_DELTA, DELTA_TOLERANCE)?.clone();
    let long_put_strike = short_put.strike - SPREAD_WIDTH;
    let long_put = chain
        .at_strike(OptionRight::Put, long_put_strike)
        .ok_or_else(|| SpreadError::MissingQuote {
            symbol: occ_symbol(underlying, expiry, OptionRight::Put, long_put_strike),
        })?
        .clone();

    let call_spread_credit = short_call.mid() - long_call.mid();
    let put_spread_credit = short_put.mid() - long_put.mid();
    let total_credit = call_spread_credit + put_spread_credit;

    let credit_floor = MIN_CREDIT_PER_SPREAD * dec!(2);
    if total_credit < credit_floor {
        return Err(SpreadError::CreditTooLow {
            credit: total_credit,
            floor: credit_floor,
        });
    }

    let quantity_dec = Decimal::from(quantity);
    let setup = IronCondorSetup {
        underlying: underlying.to_uppercase(),
        short_call_strike: short_call.strike,
        long_call_strike,
        short_put_strike: short_put.strike,
        long_put_strike,
        quantity,
        call_spread_credit,
        put_spread_credit,
        total_credit,
        max_profit: total_credit * quantity_dec,
        max_loss_per_side: (SPREAD_WIDTH - total_credit) * quantity_dec,
        expiry,
        dte: (expiry - now.date_naive()).num_days(),
        entry_time: now,
        underlying_price_at_entry: underlying_price,
        short_call_mid: short_call.mid(),
        long_call_mid: long_call.mid(),
        short_put_mid: short_put.mid(),
        long_put_mid: long_put.mid(),
    };

    info!(
        call_spread = %format!("{}/{}", setup.short_call_strike, setup.long_call_strike),
        put_spread = %format!("{}/{}", setup.short_put_strike, setup.long_put_strike),
        total_credit = %setup.total_credit,
        "Iron condor built"
    );

    Ok(setup)
}

/// Map a condor setup onto the four-leg order descriptor.
///
/// Pure function: short legs sell at their selection-time mid, long legs
/// buy at theirs, so the order's signed net credit equals the setup credit.
#[must_use]
pub fn multi_leg_order(setup: &IronCondorSetup) -> MultiLegOrder {
    let leg = |right: OptionRight, side: OrderSide, strike: Decimal, mid: Decimal| OptionLeg {
        symbol: occ_symbol(&setup.underlying, setup.expiry, right, strike),
        side,
        quantity: setup.quantity,
        option_type: right,
        strike,
        expiry: setup.expiry,
        limit_price: Some(mid),
    };

    MultiLegOrder {
        strategy_type: SpreadStrategy::IronCondor,
        legs: vec![
            leg(
                OptionRight::Call,
                OrderSide::Sell,
                setup.short_call_strike,
                setup.short_call_mid,
            ),
            leg(
                OptionRight::Call,
                OrderSide::Buy,
                setup.long_call_strike,
                setup.long_call_mid,
            ),
            leg(
                OptionRight::Put,
                OrderSide::Sell,
                setup.short_put_strike,
                setup.short_put_mid,
            ),
            leg(
                OptionRight::Put,
                OrderSide::Buy,
                setup.long_put_strike,
                setup.long_put_mid,
            ),
        ],
        net_credit: Some(setup.total_credit),
        net_debit: None,
        max_profit: Some(setup.max_profit),
        max_loss: Some(setup.max_loss_per_side * dec!(2)),
    }
}

/// A condor entry produced inside the entry window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CondorEntry {
    pub setup: IronCondorSetup,
    pub order: MultiLegOrder,
    pub generated_at: DateTime<Utc>,
}

/// Build a condor entry if the clock is inside the entry window.
///
/// Returns `Ok(None)` outside the window; construction failures (no strike
/// in tolerance, credit floor) propagate as errors.
pub async fn entry_signal(
    quotes: &dyn QuoteSource,
    underlying: &str,
    expiry: NaiveDate,
    quantity: u32,
    now: DateTime<Utc>,
) -> Result<Option<CondorEntry>, SpreadError> {
    if !in_entry_window(now) {
        debug!(underlying, "Not in condor entry window");
        return Ok(None);
    }

    let setup = build_iron_condor(quotes, underlying, expiry, quantity, now).await?;
    let order = multi_leg_order(&setup);

    info!(
        underlying,
        credit = %setup.total_credit,
        "Iron condor signal generated"
    );

    Ok(Some(CondorEntry {
        setup,
        order,
        generated_at: now,
    }))
}
