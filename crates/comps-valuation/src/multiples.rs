//! Valuation multiples and the comparable-company join.
//!
//! Every multiple divides a market value by a fundamental. When the
//! denominator is zero or negative the multiple has no meaning, so it is
//! reported as [`Multiple::NotApplicable`] with the reason, never as a
//! negative, infinite or zero placeholder.

use crate::error::{DivisionError, ValuationError};
use crate::record::FinancialRecord;
use crate::registry::MultipleKind;
use comps_data::{MarketSnapshot, Ticker};
use serde::{Serialize, Serializer};
use std::fmt;

/// A ratio that is either a finite number or undefined.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Multiple {
    /// A finite value
    Value(f64),
    /// Mathematically undefined for this company
    NotApplicable(DivisionError),
}

impl Multiple {
    /// Divide, treating a non-positive denominator as `reason`.
    fn ratio(numerator: f64, denominator: f64, reason: DivisionError) -> Self {
        if denominator.is_nan() || denominator <= 0.0 {
            return Self::NotApplicable(reason);
        }
        let value = numerator / denominator;
        if value.is_finite() {
            Self::Value(value)
        } else {
            Self::NotApplicable(DivisionError::NonFinite)
        }
    }

    /// The numeric value, if defined.
    pub const fn value(&self) -> Option<f64> {
        match self {
            Self::Value(v) => Some(*v),
            Self::NotApplicable(_) => None,
        }
    }

    /// Whether the multiple has a numeric value.
    pub const fn is_applicable(&self) -> bool {
        matches!(self, Self::Value(_))
    }

    /// Why the multiple is undefined, if it is.
    pub const fn reason(&self) -> Option<DivisionError> {
        match self {
            Self::Value(_) => None,
            Self::NotApplicable(reason) => Some(*reason),
        }
    }
}

impl fmt::Display for Multiple {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Value(v) => match f.precision() {
                Some(p) => write!(f, "{v:.p$}x"),
                None => write!(f, "{v}x"),
            },
            Self::NotApplicable(_) => f.write_str("N/A"),
        }
    }
}

/// Serialized as a number, or `null` when not applicable.
impl Serialize for Multiple {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Value(v) => serializer.serialize_f64(*v),
            Self::NotApplicable(_) => serializer.serialize_none(),
        }
    }
}

/// Price to earnings: market cap over net income.
pub fn price_to_earnings(market_cap: f64, net_income: f64) -> Multiple {
    Multiple::ratio(market_cap, net_income, DivisionError::NonPositiveEarnings)
}

/// Enterprise value over revenue.
pub fn ev_to_revenue(enterprise_value: f64, revenue: f64) -> Multiple {
    Multiple::ratio(enterprise_value, revenue, DivisionError::NonPositiveRevenue)
}

/// Enterprise value over EBITDA.
pub fn ev_to_ebitda(enterprise_value: f64, ebitda: f64) -> Multiple {
    Multiple::ratio(enterprise_value, ebitda, DivisionError::NonPositiveEbitda)
}

/// Price to sales: market cap over revenue.
pub fn price_to_sales(market_cap: f64, revenue: f64) -> Multiple {
    Multiple::ratio(market_cap, revenue, DivisionError::NonPositiveRevenue)
}

/// Net income over revenue, as a fraction.
pub fn net_margin(net_income: f64, revenue: f64) -> Multiple {
    Multiple::ratio(net_income, revenue, DivisionError::NonPositiveRevenue)
}

/// One company's fundamentals joined with its market data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ComparableEntry {
    /// Company identifier
    pub ticker: Ticker,
    /// Company name, when known
    pub name: Option<String>,
    /// The extracted fundamentals
    pub record: FinancialRecord,
    /// Price times shares outstanding
    pub market_cap: f64,
    /// Enterprise value used for EV multiples
    pub enterprise_value: f64,
    /// Market cap over net income
    pub pe: Multiple,
    /// Enterprise value over revenue
    pub ev_revenue: Multiple,
    /// Enterprise value over EBITDA
    pub ev_ebitda: Multiple,
    /// Market cap over revenue
    pub ps: Multiple,
    /// Net income over revenue
    pub net_margin: Multiple,
}

impl ComparableEntry {
    /// Join a record with the market snapshot of the same company.
    ///
    /// Tickers compare case-insensitively. Both sides must be in the same currency.
    ///
    /// # Errors
    /// Returns [`ValuationError::IdentifierMismatch`] or
    /// [`ValuationError::CurrencyMismatch`] when the two sides cannot be joined.
    pub fn compute(
        record: FinancialRecord,
        snapshot: &MarketSnapshot,
    ) -> Result<Self, ValuationError> {
        if !record
            .ticker
            .as_str()
            .eq_ignore_ascii_case(snapshot.ticker.as_str())
        {
            return Err(ValuationError::IdentifierMismatch {
                record: record.ticker.to_string(),
                snapshot: snapshot.ticker.to_string(),
            });
        }
        if !record.currency.eq_ignore_ascii_case(&snapshot.currency) {
            return Err(ValuationError::CurrencyMismatch {
                record: record.currency,
                snapshot: snapshot.currency.clone(),
            });
        }

        let market_cap = snapshot.market_cap();
        let enterprise_value = snapshot.enterprise_value();

        Ok(Self {
            ticker: record.ticker.clone(),
            name: None,
            pe: price_to_earnings(market_cap, record.net_income),
            ev_revenue: ev_to_revenue(enterprise_value, record.revenue),
            ev_ebitda: ev_to_ebitda(enterprise_value, record.ebitda),
            ps: price_to_sales(market_cap, record.revenue),
            net_margin: record.net_margin(),
            market_cap,
            enterprise_value,
            record,
        })
    }

    /// Attach a display name.
    pub fn with_name(mut self, name: Option<String>) -> Self {
        self.name = name;
        self
    }

    /// Look up a multiple by kind.
    pub const fn multiple(&self, kind: MultipleKind) -> Multiple {
        match kind {
            MultipleKind::PriceToEarnings => self.pe,
            MultipleKind::EvToRevenue => self.ev_revenue,
            MultipleKind::EvToEbitda => self.ev_ebitda,
            MultipleKind::PriceToSales => self.ps,
            MultipleKind::NetMargin => self.net_margin,
        }
    }
}
