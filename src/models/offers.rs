use serde::{Deserialize, Serialize};

use super::{ProviderOffer, RegionOffers, WatchProviders};

/// Offer categories that count toward regional availability
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OfferCategory {
    Subscription,
    AdSupported,
    Purchase,
    Rental,
}

impl OfferCategory {
    pub const ALL: [OfferCategory; 4] = [
        OfferCategory::Subscription,
        OfferCategory::AdSupported,
        OfferCategory::Purchase,
        OfferCategory::Rental,
    ];

    /// The offers of this category within one region's record
    pub fn offers(self, region: &RegionOffers) -> &[ProviderOffer] {
        match self {
            OfferCategory::Subscription => &region.flatrate,
            OfferCategory::AdSupported => &region.ads,
            OfferCategory::Purchase => &region.buy,
            OfferCategory::Rental => &region.rent,
        }
    }
}

impl WatchProviders {
    /// Whether `provider_id` offers the title in `region` under `category`
    ///
    /// A region missing from the record means no offers, not an error.
    pub fn offered_as(&self, region: &str, provider_id: u64, category: OfferCategory) -> bool {
        self.results
            .get(region)
            .map(|offers| {
                category
                    .offers(offers)
                    .iter()
                    .any(|offer| offer.provider_id == provider_id)
            })
            .unwrap_or(false)
    }

    /// Whether `provider_id` offers the title in `region` in any counted category
    pub fn is_available(&self, region: &str, provider_id: u64) -> bool {
        OfferCategory::ALL
            .into_iter()
            .any(|category| self.offered_as(region, provider_id, category))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const NETFLIX: u64 = 8;
    const WATCHA: u64 = 97;

    fn offer(provider_id: u64, name: &str) -> ProviderOffer {
        ProviderOffer {
            provider_id,
            provider_name: name.to_string(),
        }
    }

    fn providers_json() -> WatchProviders {
        serde_json::from_str(
            r#"{
                "id": 27205,
                "results": {
                    "US": {
                        "link": "https://www.themoviedb.org/movie/27205/watch?locale=US",
                        "flatrate": [{"provider_id": 8, "provider_name": "Netflix"}],
                        "rent": [{"provider_id": 2, "provider_name": "Apple TV"}]
                    },
                    "KR": {
                        "buy": [{"provider_id": 97, "provider_name": "Watcha"}]
                    }
                }
            }"#,
        )
        .unwrap()
    }

    #[test]
    fn test_subscription_offer_is_available() {
        let providers = providers_json();
        assert!(providers.offered_as("US", NETFLIX, OfferCategory::Subscription));
        assert!(providers.is_available("US", NETFLIX));
    }

    #[test]
    fn test_purchase_offer_counts() {
        let providers = providers_json();
        assert!(providers.offered_as("KR", WATCHA, OfferCategory::Purchase));
        assert!(providers.is_available("KR", WATCHA));
        assert!(!providers.is_available("KR", NETFLIX));
    }

    #[test]
    fn test_missing_region_is_not_available() {
        let providers = providers_json();
        for category in OfferCategory::ALL {
            assert!(!providers.offered_as("JP", NETFLIX, category));
        }
        assert!(!providers.is_available("JP", NETFLIX));
    }

    #[test]
    fn test_free_tier_is_not_counted() {
        let mut providers = WatchProviders::default();
        providers.results.insert(
            "KR".to_string(),
            RegionOffers {
                free: vec![offer(NETFLIX, "Netflix")],
                ..RegionOffers::default()
            },
        );
        assert!(!providers.is_available("KR", NETFLIX));
    }

    #[test]
    fn test_ad_supported_and_rental_count() {
        let mut providers = WatchProviders::default();
        providers.results.insert(
            "KR".to_string(),
            RegionOffers {
                ads: vec![offer(WATCHA, "Watcha")],
                rent: vec![offer(NETFLIX, "Netflix")],
                ..RegionOffers::default()
            },
        );
        assert!(providers.offered_as("KR", WATCHA, OfferCategory::AdSupported));
        assert!(providers.offered_as("KR", NETFLIX, OfferCategory::Rental));
    }
}
