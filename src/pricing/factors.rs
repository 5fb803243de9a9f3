use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::vehicle::VehicleSpec;

/// The named factors of the local attribution model.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FactorName {
    Year,
    Mileage,
    Age,
    Power,
    Fuel,
}

impl FactorName {
    pub const ALL: [FactorName; 5] = [
        FactorName::Year,
        FactorName::Mileage,
        FactorName::Age,
        FactorName::Power,
        FactorName::Fuel,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FactorName::Year => "year",
            FactorName::Mileage => "mileage",
            FactorName::Age => "age",
            FactorName::Power => "power",
            FactorName::Fuel => "fuel",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FactorName::Year => "Model Year",
            FactorName::Mileage => "Mileage",
            FactorName::Age => "Age",
            FactorName::Power => "Power",
            FactorName::Fuel => "Fuel Efficiency",
        }
    }
}

/// Signed per-factor contributions, in currency units.
///
/// Values are raw (unrounded). A remote service may report factors beyond
/// the five local ones (e.g. `brand`); those are kept in `other`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FactorBreakdown {
    #[serde(default)]
    pub year: f64,
    #[serde(default)]
    pub mileage: f64,
    #[serde(default)]
    pub age: f64,
    #[serde(default)]
    pub power: f64,
    #[serde(default)]
    pub fuel: f64,
    #[serde(flatten)]
    pub other: BTreeMap<String, f64>,
}

impl FactorBreakdown {
    pub fn get(&self, name: FactorName) -> f64 {
        match name {
            FactorName::Year => self.year,
            FactorName::Mileage => self.mileage,
            FactorName::Age => self.age,
            FactorName::Power => self.power,
            FactorName::Fuel => self.fuel,
        }
    }

    /// All contributions as (key, value), named factors first.
    pub fn entries(&self) -> Vec<(String, f64)> {
        FactorName::ALL
            .iter()
            .map(|name| (name.key().to_string(), self.get(*name)))
            .chain(self.other.iter().map(|(k, v)| (k.clone(), *v)))
            .collect()
    }

    pub fn total(&self) -> f64 {
        self.entries().iter().map(|(_, v)| v).sum()
    }
}

/// Qualitative read of one attribute: does it help or hurt the price?
#[derive(Debug, Clone, PartialEq)]
pub struct FactorHint {
    pub factor: FactorName,
    pub positive: bool,
}

/// Rule-of-thumb hints shown beside an estimate.
pub fn factor_hints(spec: &VehicleSpec) -> Vec<FactorHint> {
    vec![
        FactorHint {
            factor: FactorName::Mileage,
            positive: spec.mileage_km < 100_000.0,
        },
        FactorHint {
            factor: FactorName::Year,
            positive: spec.manufacturing_year > 2018.0,
        },
        FactorHint {
            factor: FactorName::Fuel,
            positive: spec.fuel_consumption_l_per_100km < 8.0,
        },
        FactorHint {
            factor: FactorName::Power,
            positive: spec.power_ps > 150.0,
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_total_includes_extra_factors() {
        let mut breakdown = FactorBreakdown {
            year: 100.0,
            mileage: -50.0,
            ..FactorBreakdown::default()
        };
        breakdown.other.insert("brand".to_string(), 25.0);
        assert_eq!(breakdown.total(), 75.0);
        assert_eq!(breakdown.entries().len(), 6);
        assert_eq!(breakdown.entries()[5].0, "brand");
    }

    #[test]
    fn test_parse_service_factors() {
        let json = r#"{"year": 10000, "mileage": -2500, "age": -4500, "power": 6300, "fuel": 1750, "brand": 7500}"#;
        let breakdown: FactorBreakdown = serde_json::from_str(json).unwrap();
        assert_eq!(breakdown.year, 10000.0);
        assert_eq!(breakdown.other.get("brand"), Some(&7500.0));
    }

    #[test]
    fn test_serialize_is_flat() {
        let breakdown = FactorBreakdown {
            fuel: 1.5,
            ..FactorBreakdown::default()
        };
        let json = serde_json::to_value(&breakdown).unwrap();
        assert_eq!(json["fuel"], 1.5);
        assert_eq!(json.as_object().unwrap().len(), 5);
    }

    #[test]
    fn test_hints_for_default_spec() {
        let hints = factor_hints(&VehicleSpec::default());
        assert!(hints.iter().all(|h| h.positive));
    }

    #[test]
    fn test_hints_for_worn_car() {
        let spec = VehicleSpec {
            mileage_km: 150_000.0,
            manufacturing_year: 2012.0,
            fuel_consumption_l_per_100km: 9.0,
            power_ps: 90.0,
            ..VehicleSpec::default()
        };
        assert!(factor_hints(&spec).iter().all(|h| !h.positive));
    }
}
