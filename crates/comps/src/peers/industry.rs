//! Industries with a curated peer list.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Industries with a curated list of comparable companies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Industry {
    /// Consumer Electronics
    ConsumerElectronics,

    /// Software—Infrastructure
    SoftwareInfrastructure,

    /// Internet Content & Information
    InternetContent,

    /// Consumer Interactive Entertainment
    InteractiveEntertainment,

    /// E-Commerce
    ECommerce,
}

impl Industry {
    /// Returns all curated industries.
    pub fn all() -> Vec<Self> {
        vec![
            Self::ConsumerElectronics,
            Self::SoftwareInfrastructure,
            Self::InternetContent,
            Self::InteractiveEntertainment,
            Self::ECommerce,
        ]
    }

    /// Returns the industry name as the market data service labels it.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::ConsumerElectronics => "Consumer Electronics",
            Self::SoftwareInfrastructure => "Software—Infrastructure",
            Self::InternetContent => "Internet Content & Information",
            Self::InteractiveEntertainment => "Consumer Interactive Entertainment",
            Self::ECommerce => "E-Commerce",
        }
    }

    /// Other labels used for the same industry.
    const fn aliases(&self) -> &'static [&'static str] {
        match self {
            Self::ConsumerElectronics | Self::SoftwareInfrastructure | Self::InternetContent => {
                &[]
            }
            Self::InteractiveEntertainment => &["Electronic Gaming & Multimedia"],
            Self::ECommerce => &["Internet Retail"],
        }
    }

    /// Curated peers, most representative first.
    pub const fn peers(&self) -> &'static [&'static str] {
        match self {
            Self::ConsumerElectronics => &["AAPL", "SONY", "HPQ", "DELL", "LNVGY"],
            Self::SoftwareInfrastructure => &["MSFT", "ORCL", "ADBE", "SNOW", "PLTR"],
            Self::InternetContent => &["GOOGL", "META", "SNAP", "PINS", "SPOT"],
            Self::InteractiveEntertainment => &["MSFT", "SONY", "NTDOY", "EA", "TTWO"],
            Self::ECommerce => &["AMZN", "EBAY", "ETSY", "BABA", "MELI"],
        }
    }

    /// Parse an industry label.
    ///
    /// Matching ignores case, punctuation and spacing, so
    /// `"Software - Infrastructure"` and `"Software—Infrastructure"` agree.
    pub fn from_name(name: &str) -> Option<Self> {
        let wanted = normalize(name);
        if wanted.is_empty() {
            return None;
        }
        Self::all().into_iter().find(|industry| {
            normalize(industry.name()) == wanted
                || industry.aliases().iter().any(|a| normalize(a) == wanted)
        })
    }
}

fn normalize(label: &str) -> String {
    label
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

impl fmt::Display for Industry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_all_industries() {
        assert_eq!(Industry::all().len(), 5);
        for industry in Industry::all() {
            assert_eq!(industry.peers().len(), 5);
        }
    }

    #[rstest]
    #[case("Consumer Electronics", Industry::ConsumerElectronics)]
    #[case("Software—Infrastructure", Industry::SoftwareInfrastructure)]
    #[case("Software - Infrastructure", Industry::SoftwareInfrastructure)]
    #[case("internet content & information", Industry::InternetContent)]
    #[case("Electronic Gaming & Multimedia", Industry::InteractiveEntertainment)]
    #[case("Internet Retail", Industry::ECommerce)]
    #[case("E-Commerce", Industry::ECommerce)]
    fn test_from_name(#[case] label: &str, #[case] expected: Industry) {
        assert_eq!(Industry::from_name(label), Some(expected));
    }

    #[test]
    fn test_unknown_industry() {
        assert_eq!(Industry::from_name("Banks—Regional"), None);
        assert_eq!(Industry::from_name(" — "), None);
    }

    #[test]
    fn test_display() {
        assert_eq!(
            Industry::InternetContent.to_string(),
            "Internet Content & Information"
        );
    }
}
