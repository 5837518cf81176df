//! Multiple Registry
//!
//! Central registry for the valuation multiples reported for a peer group.
//! Presentation code walks this list instead of hard-coding columns.

use derive_more::Display;
use serde::Serialize;

/// Available multiples
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, Serialize)]
pub enum MultipleKind {
    /// Market cap over net income
    #[display("P/E")]
    PriceToEarnings,
    /// Enterprise value over revenue
    #[display("EV/Revenue")]
    EvToRevenue,
    /// Enterprise value over EBITDA
    #[display("EV/EBITDA")]
    EvToEbitda,
    /// Market cap over revenue
    #[display("P/S")]
    PriceToSales,
    /// Net income over revenue
    #[display("Net Margin")]
    NetMargin,
}

/// How a multiple is rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MultipleFormat {
    /// `12.3x` with the given number of decimals
    Times(usize),
    /// `25.3%` with the given number of decimals
    Percent(usize),
}

/// Multiple metadata
#[derive(Debug, Clone)]
pub struct MultipleInfo {
    /// The multiple
    pub kind: MultipleKind,
    /// Column-safe identifier
    pub name: &'static str,
    /// Brief description of what the multiple measures
    pub description: &'static str,
    /// Rendering
    pub format: MultipleFormat,
}

/// Get all available multiple info, in display order
pub fn available_multiples() -> Vec<MultipleInfo> {
    vec![
        MultipleInfo {
            kind: MultipleKind::PriceToEarnings,
            name: "pe",
            description: "Market capitalization to net income",
            format: MultipleFormat::Times(1),
        },
        MultipleInfo {
            kind: MultipleKind::EvToRevenue,
            name: "ev_revenue",
            description: "Enterprise value to revenue",
            format: MultipleFormat::Times(2),
        },
        MultipleInfo {
            kind: MultipleKind::EvToEbitda,
            name: "ev_ebitda",
            description: "Enterprise value to EBITDA",
            format: MultipleFormat::Times(2),
        },
        MultipleInfo {
            kind: MultipleKind::PriceToSales,
            name: "ps",
            description: "Market capitalization to revenue",
            format: MultipleFormat::Times(2),
        },
        MultipleInfo {
            kind: MultipleKind::NetMargin,
            name: "net_margin",
            description: "Net income to revenue",
            format: MultipleFormat::Percent(2),
        },
    ]
}

/// Get info for a specific multiple
pub fn get_multiple_info(kind: MultipleKind) -> Option<MultipleInfo> {
    available_multiples().into_iter().find(|m| m.kind == kind)
}

/// Look up a multiple by its identifier (e.g. `"ev_ebitda"`)
pub fn multiple_by_name(name: &str) -> Option<MultipleInfo> {
    available_multiples()
        .into_iter()
        .find(|m| m.name.eq_ignore_ascii_case(name))
}
