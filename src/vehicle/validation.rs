use std::fmt;

use super::catalog::{CategoricalField, OptionsCatalog};
use super::types::VehicleSpec;

/// Documented input domains (inclusive).
pub const MANUFACTURING_YEAR_RANGE: (f64, f64) = (1990.0, 2024.0);
pub const POWER_KW_RANGE: (f64, f64) = (50.0, 500.0);
pub const POWER_PS_RANGE: (f64, f64) = (68.0, 680.0);
pub const FUEL_L_PER_100KM_RANGE: (f64, f64) = (3.0, 20.0);
pub const FUEL_G_PER_KM_RANGE: (f64, f64) = (50.0, 300.0);
pub const MILEAGE_KM_RANGE: (f64, f64) = (0.0, 500_000.0);
pub const REGISTRATION_MONTH_RANGE: (u32, u32) = (1, 12);

/// An input outside its documented domain. Advisory only: estimation still runs.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationWarning {
    pub field: &'static str,
    pub message: String,
}

impl fmt::Display for ValidationWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a spec against the numeric domains and the catalog.
/// Returns every warning at once (not just the first).
pub fn validate_spec(spec: &VehicleSpec, catalog: &OptionsCatalog) -> Vec<ValidationWarning> {
    let mut warnings = Vec::new();

    let numeric = [
        ("manufacturingYear", spec.manufacturing_year, MANUFACTURING_YEAR_RANGE),
        ("powerKw", spec.power_kw, POWER_KW_RANGE),
        ("powerPs", spec.power_ps, POWER_PS_RANGE),
        (
            "fuelConsumptionLPer100Km",
            spec.fuel_consumption_l_per_100km,
            FUEL_L_PER_100KM_RANGE,
        ),
        (
            "fuelConsumptionGPerKm",
            spec.fuel_consumption_g_per_km,
            FUEL_G_PER_KM_RANGE,
        ),
        ("mileageKm", spec.mileage_km, MILEAGE_KM_RANGE),
    ];

    for (field, value, (low, high)) in numeric {
        if !value.is_finite() {
            warnings.push(ValidationWarning {
                field,
                message: "not a finite number, treated as 0".to_string(),
            });
        } else if value < low || value > high {
            warnings.push(ValidationWarning {
                field,
                message: format!("{} is outside {}-{}", value, low, high),
            });
        }
    }

    let (low, high) = REGISTRATION_MONTH_RANGE;
    if !(low..=high).contains(&spec.registration_month) {
        warnings.push(ValidationWarning {
            field: "registrationMonth",
            message: format!("{} is outside {}-{}", spec.registration_month, low, high),
        });
    }

    if let Some(age) = spec.car_age_years {
        if !age.is_finite() || age < 0.0 {
            warnings.push(ValidationWarning {
                field: "carAgeYears",
                message: format!("{} is not a valid age", age),
            });
        }
    }

    let categorical = [
        (CategoricalField::Brand, &spec.brand),
        (CategoricalField::Color, &spec.color),
        (CategoricalField::TransmissionType, &spec.transmission_type),
        (CategoricalField::FuelType, &spec.fuel_type),
    ];

    for (field, value) in categorical {
        if value.trim().is_empty() {
            warnings.push(ValidationWarning {
                field: field.name(),
                message: "is empty".to_string(),
            });
        } else if !catalog.contains(field, value) {
            warnings.push(ValidationWarning {
                field: field.name(),
                message: format!("'{}' is not in the options catalog", value),
            });
        }
    }

    warnings
}
