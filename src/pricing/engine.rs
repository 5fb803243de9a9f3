use chrono::{DateTime, Datelike, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::factors::FactorBreakdown;
use crate::vehicle::VehicleSpec;

pub const BASE_PRICE: f64 = 25_000.0;
/// Average listing price an estimate is positioned against.
pub const MARKET_AVERAGE: f64 = 25_000.0;
const REFERENCE_YEAR: f64 = 2015.0;
const PER_YEAR: f64 = 2_000.0;
const PER_1000_KM: f64 = 50.0;
const PER_AGE_YEAR: f64 = 1_500.0;
const REFERENCE_PS: f64 = 100.0;
const PER_PS: f64 = 100.0;
const REFERENCE_FUEL: f64 = 10.0;
const PER_LITRE: f64 = 500.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Confidence {
    Low,
    Medium,
    High,
}

impl fmt::Display for Confidence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Confidence::Low => "Low",
            Confidence::Medium => "Medium",
            Confidence::High => "High",
        };
        write!(f, "{}", s)
    }
}

impl FromStr for Confidence {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "low" => Ok(Confidence::Low),
            "medium" => Ok(Confidence::Medium),
            "high" => Ok(Confidence::High),
            other => Err(format!("unknown confidence label '{}'", other)),
        }
    }
}

/// Whether an estimate lies above or below [`MARKET_AVERAGE`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarketPosition {
    AboveAverage,
    BelowAverage,
}

impl fmt::Display for MarketPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MarketPosition::AboveAverage => write!(f, "Above Average"),
            MarketPosition::BelowAverage => write!(f, "Below Average"),
        }
    }
}

/// Where an estimate's numbers came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EstimateSource {
    Local,
    Service,
}

/// A predicted price plus its explanation. Immutable once built.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Estimate {
    /// Rounded, never negative.
    pub predicted_price: f64,
    #[serde(rename = "confidenceLabel")]
    pub confidence: Confidence,
    pub factors: FactorBreakdown,
    /// Unfloored, unrounded sum. Only known for local estimates.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_price: Option<f64>,
    #[serde(default = "default_source")]
    pub source: EstimateSource,
    pub source_spec: VehicleSpec,
    pub created_at: DateTime<Utc>,
}

fn default_source() -> EstimateSource {
    EstimateSource::Local
}

impl Estimate {
    /// True when the raw sum went negative and was floored to zero. The
    /// factor breakdown then no longer adds up to the predicted price.
    pub fn is_floored(&self) -> bool {
        self.raw_price.is_some_and(|raw| raw < 0.0)
    }

    /// An estimate exactly at the average counts as below it.
    pub fn market_position(&self) -> MarketPosition {
        if self.predicted_price > MARKET_AVERAGE {
            MarketPosition::AboveAverage
        } else {
            MarketPosition::BelowAverage
        }
    }
}

/// Fixed linear attribution model over five named factors.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FactorModel {
    current_year: i32,
}

impl Default for FactorModel {
    fn default() -> Self {
        Self::new(Utc::now().year())
    }
}

impl FactorModel {
    /// `current_year` is used to derive car age when the spec doesn't carry one.
    pub fn new(current_year: i32) -> Self {
        Self { current_year }
    }

    pub fn current_year(&self) -> i32 {
        self.current_year
    }

    pub fn factors(&self, spec: &VehicleSpec) -> FactorBreakdown {
        let spec = spec.sanitized();
        FactorBreakdown {
            year: (spec.manufacturing_year - REFERENCE_YEAR) * PER_YEAR,
            mileage: -(spec.mileage_km / 1000.0) * PER_1000_KM,
            age: -(spec.age_years(self.current_year) * PER_AGE_YEAR),
            power: (spec.power_ps - REFERENCE_PS) * PER_PS,
            fuel: (REFERENCE_FUEL - spec.fuel_consumption_l_per_100km) * PER_LITRE,
            other: Default::default(),
        }
    }

    pub fn estimate(&self, spec: &VehicleSpec) -> Estimate {
        self.estimate_at(spec, Utc::now())
    }

    pub fn estimate_at(&self, spec: &VehicleSpec, created_at: DateTime<Utc>) -> Estimate {
        let factors = self.factors(spec);
        let raw_price = BASE_PRICE + factors.total();

        log::debug!(
            "Local estimate for {}: raw {:.2} from {:?}",
            spec.label(),
            raw_price,
            factors
        );

        Estimate {
            predicted_price: floor_and_round(raw_price),
            confidence: Confidence::High,
            factors,
            raw_price: Some(raw_price),
            source: EstimateSource::Local,
            source_spec: spec.sanitized(),
            created_at,
        }
    }
}

/// Round to the nearest whole unit, then floor at zero.
pub(crate) fn floor_and_round(raw: f64) -> f64 {
    let rounded = raw.round();
    if rounded > 0.0 {
        rounded
    } else {
        0.0
    }
}
