//! Market price outlook per crop (₹ per quintal) with a five-step forecast.

use serde::Serialize;

use crate::algo::string_distance::{closest_match, SUGGESTION_THRESHOLD};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PriceOutlook {
    pub crop: &'static str,
    pub current: u32,
    pub trend: &'static str,
    pub forecast: [u32; 5],
}

const PRICES: &[PriceOutlook] = &[
    PriceOutlook {
        crop: "Wheat",
        current: 2200,
        trend: "+5%",
        forecast: [2150, 2180, 2200, 2220, 2250],
    },
    PriceOutlook {
        crop: "Maize",
        current: 1850,
        trend: "-2%",
        forecast: [1900, 1880, 1860, 1850, 1840],
    },
    PriceOutlook {
        crop: "Rice",
        current: 2500,
        trend: "+3%",
        forecast: [2400, 2450, 2500, 2550, 2600],
    },
    PriceOutlook {
        crop: "Cotton",
        current: 6500,
        trend: "+10%",
        forecast: [5800, 6000, 6200, 6500, 6800],
    },
    PriceOutlook {
        crop: "Sugarcane",
        current: 310,
        trend: "Stable",
        forecast: [310, 310, 310, 310, 310],
    },
];

/// Crops with a price outlook, in display order.
pub fn known_crops() -> Vec<&'static str> {
    PRICES.iter().map(|p| p.crop).collect()
}

/// Case-insensitive lookup.
pub fn price_outlook(crop: &str) -> Option<&'static PriceOutlook> {
    let crop = crop.trim();
    PRICES.iter().find(|p| p.crop.eq_ignore_ascii_case(crop))
}

/// Closest known crop name for a lookup miss.
pub fn suggest_crop(crop: &str) -> Option<&'static str> {
    closest_match(crop.trim(), &known_crops(), SUGGESTION_THRESHOLD)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_ignores_case() {
        let rice = price_outlook("rice").unwrap();
        assert_eq!(rice.crop, "Rice");
        assert_eq!(rice.current, 2500);
        assert_eq!(price_outlook(" COTTON ").unwrap().trend, "+10%");
    }

    #[test]
    fn unknown_crop() {
        assert!(price_outlook("Tea").is_none());
        assert_eq!(suggest_crop("Tea"), None);
    }

    #[test]
    fn typo_gets_suggestion() {
        assert!(price_outlook("Wheet").is_none());
        assert_eq!(suggest_crop("Wheet"), Some("Wheat"));
    }

    #[test]
    fn sugarcane_is_flat() {
        let cane = price_outlook("Sugarcane").unwrap();
        assert!(cane.forecast.iter().all(|&p| p == cane.current));
    }

    #[test]
    fn five_known_crops() {
        assert_eq!(
            known_crops(),
            vec!["Wheat", "Maize", "Rice", "Cotton", "Sugarcane"]
        );
    }
}
