use serde::{Deserialize, Deserializer, Serialize};

/// A comparable listing offered as a recommendation. Read-only to the ranker.
///
/// Accepts both snake_case and camelCase keys, and ids given as strings or
/// integers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateListing {
    #[serde(deserialize_with = "string_or_number")]
    pub id: String,
    #[serde(default)]
    pub brand: Option<String>,
    #[serde(default)]
    pub year: Option<f64>,
    #[serde(default, alias = "powerPs")]
    pub power_ps: Option<f64>,
    #[serde(default, alias = "transmissionType")]
    pub transmission_type: Option<String>,
    #[serde(default, alias = "fuelType")]
    pub fuel_type: Option<String>,
    #[serde(default, alias = "mileageKm", alias = "mileage_in_km")]
    pub mileage_km: Option<f64>,
    #[serde(default, alias = "priceInEuro")]
    pub price_in_euro: Option<f64>,
    /// Relevance in [0, 100].
    #[serde(default, alias = "matchScore")]
    pub match_score: Option<f64>,
}

impl CandidateListing {
    /// "BMW • 2019", or just the id when nothing else is known.
    pub fn headline(&self) -> String {
        match (&self.brand, self.year) {
            (Some(brand), Some(year)) => format!("{} • {}", brand.to_uppercase(), year),
            (Some(brand), None) => brand.to_uppercase(),
            (None, Some(year)) => year.to_string(),
            (None, None) => format!("#{}", self.id),
        }
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum RawId {
        Text(String),
        Integer(i64),
        Float(f64),
    }

    Ok(match RawId::deserialize(deserializer)? {
        RawId::Text(s) => s,
        RawId::Integer(n) => n.to_string(),
        RawId::Float(n) => n.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_snake_case_listing() {
        let json = r#"{
            "id": 42,
            "brand": "bmw",
            "year": 2019,
            "power_ps": 190,
            "transmission_type": "automatic",
            "fuel_type": "diesel",
            "mileage_in_km": 61000,
            "price_in_euro": 31500,
            "match_score": 87
        }"#;
        let listing: CandidateListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, "42");
        assert_eq!(listing.mileage_km, Some(61000.0));
        assert_eq!(listing.price_in_euro, Some(31500.0));
        assert_eq!(listing.match_score, Some(87.0));
        assert_eq!(listing.headline(), "BMW • 2019");
    }

    #[test]
    fn test_parse_camel_case_listing_with_gaps() {
        let json = r#"{"id": "a-1", "priceInEuro": 20000, "matchScore": 55.5}"#;
        let listing: CandidateListing = serde_json::from_str(json).unwrap();
        assert_eq!(listing.id, "a-1");
        assert_eq!(listing.price_in_euro, Some(20000.0));
        assert_eq!(listing.match_score, Some(55.5));
        assert!(listing.brand.is_none());
        assert_eq!(listing.headline(), "#a-1");
    }
}
