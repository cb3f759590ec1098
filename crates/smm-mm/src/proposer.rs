//! Quote proposal for one tick.
//!
//! Reads price and balances from the connector and indicators from the
//! window, then produces a two-sided limit maker proposal trimmed by the
//! connector's budget checker. Every early exit is a [`SkipReason`], never an
//! error.

use rust_decimal::Decimal;
use smm_core::{OrderIntent, OrderSide, Price, Proposal};
use smm_feed::{IndicatorWindow, Indicators};
use std::fmt;
use tracing::{debug, info};

use crate::config::MakerConfig;
use crate::connector::Connector;
use crate::inventory::{compute_amount, SizingDecision};
use crate::spread::{compute_half_spread, quote_prices};
use crate::trend::should_suppress;

/// Why no orders are proposed this tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum SkipReason {
    /// The connector has no reference price.
    PriceUnavailable,
    /// The connector reports no balance for the base or quote asset.
    BalanceUnavailable,
    /// The window does not yet hold enough candles.
    IndicatorsNotReady,
    /// The trend signal is outside the quoting band.
    SuppressedByTrend { trend_signal: f64 },
    /// The budget checker could not fund both legs.
    InsufficientBudget,
}

impl SkipReason {
    /// Short label for metrics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::PriceUnavailable => "price_unavailable",
            Self::BalanceUnavailable => "balance_unavailable",
            Self::IndicatorsNotReady => "indicators_not_ready",
            Self::SuppressedByTrend { .. } => "suppressed_by_trend",
            Self::InsufficientBudget => "insufficient_budget",
        }
    }
}

impl fmt::Display for SkipReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::SuppressedByTrend { trend_signal } => {
                write!(f, "suppressed_by_trend({trend_signal:.2})")
            }
            other => f.write_str(other.as_str()),
        }
    }
}

/// Values computed on the way to a proposal.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct QuoteContext {
    pub reference_price: Price,
    pub trend_signal: f64,
    pub volatility: f64,
    pub half_spread: Decimal,
    pub sizing: SizingDecision,
}

/// Result of [`propose`].
#[derive(Debug, Clone, PartialEq)]
pub enum ProposalOutcome {
    Ready {
        proposal: Proposal,
        context: QuoteContext,
    },
    Skipped {
        reason: SkipReason,
        /// Present when the skip happened after quotes were computed.
        context: Option<QuoteContext>,
    },
}

impl ProposalOutcome {
    fn skipped(reason: SkipReason) -> Self {
        Self::Skipped {
            reason,
            context: None,
        }
    }

    /// The proposal to place; empty when skipped.
    pub fn into_proposal(self) -> Proposal {
        match self {
            Self::Ready { proposal, .. } => proposal,
            Self::Skipped { .. } => Proposal::empty(),
        }
    }

    pub fn proposal(&self) -> Option<&Proposal> {
        match self {
            Self::Ready { proposal, .. } => Some(proposal),
            Self::Skipped { .. } => None,
        }
    }

    pub fn skip_reason(&self) -> Option<SkipReason> {
        match self {
            Self::Ready { .. } => None,
            Self::Skipped { reason, .. } => Some(*reason),
        }
    }

    pub fn context(&self) -> Option<&QuoteContext> {
        match self {
            Self::Ready { context, .. } => Some(context),
            Self::Skipped { context, .. } => context.as_ref(),
        }
    }
}

/// Build this tick's proposal.
pub fn propose<C>(connector: &C, window: &IndicatorWindow, config: &MakerConfig) -> ProposalOutcome
where
    C: Connector + ?Sized,
{
    let pair = &config.trading_pair;

    let Some(reference_price) = connector.reference_price(pair, config.price_type) else {
        debug!(pair = %pair, "No reference price, skipping proposal");
        return ProposalOutcome::skipped(SkipReason::PriceUnavailable);
    };
    let (Some(base_balance), Some(quote_balance)) =
        (connector.balance(pair.base()), connector.balance(pair.quote()))
    else {
        debug!(pair = %pair, "Balances unavailable, skipping proposal");
        return ProposalOutcome::skipped(SkipReason::BalanceUnavailable);
    };

    let (trend_signal, volatility) = match window.latest_indicators() {
        Indicators::Ready {
            trend_signal,
            volatility,
        } => (trend_signal, volatility),
        Indicators::NotReady => {
            debug!(
                candles = window.len(),
                required = window.config().min_candles(),
                "Indicators not ready, skipping proposal"
            );
            return ProposalOutcome::skipped(SkipReason::IndicatorsNotReady);
        }
    };

    if should_suppress(trend_signal, config) {
        info!(
            trend = %format!("{trend_signal:.2}"),
            lower = config.trend_lower,
            upper = config.trend_upper,
            "Trend too strong, skipping orders"
        );
        return ProposalOutcome::skipped(SkipReason::SuppressedByTrend { trend_signal });
    }

    let half_spread = compute_half_spread(volatility, config);
    let (bid, ask) = quote_prices(reference_price, half_spread);
    let sizing = compute_amount(base_balance, quote_balance, reference_price, config);

    let context = QuoteContext {
        reference_price,
        trend_signal,
        volatility,
        half_spread,
        sizing,
    };

    let proposal = Proposal::two_sided(
        OrderIntent::limit_maker(pair.clone(), OrderSide::Buy, bid, sizing.amount),
        OrderIntent::limit_maker(pair.clone(), OrderSide::Sell, ask, sizing.amount),
    );

    let adjusted = connector.budget_checker().adjust(proposal, true);
    if adjusted.is_empty() {
        info!(
            pair = %pair,
            amount = %sizing.amount,
            bid = %bid,
            ask = %ask,
            "Insufficient budget, skipping orders"
        );
        return ProposalOutcome::Skipped {
            reason: SkipReason::InsufficientBudget,
            context: Some(context),
        };
    }

    debug!(
        pair = %pair,
        reference = %reference_price,
        trend = trend_signal,
        volatility,
        half_spread = %half_spread,
        inventory_ratio = %sizing.inventory_ratio,
        amount = %sizing.amount,
        "Proposal built"
    );

    ProposalOutcome::Ready {
        proposal: adjusted,
        context,
    }
}
