use serde::{Deserialize, Serialize};

/// Structured description of a vehicle, used as model input.
///
/// Numeric fields missing from serialized input deserialize to zero. Field
/// names on the wire are camelCase (`manufacturingYear`, `powerPs`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VehicleSpec {
    #[serde(default)]
    pub manufacturing_year: f64,
    #[serde(default)]
    pub power_kw: f64,
    #[serde(default)]
    pub power_ps: f64,
    #[serde(default, rename = "fuelConsumptionLPer100Km")]
    pub fuel_consumption_l_per_100km: f64,
    #[serde(default)]
    pub fuel_consumption_g_per_km: f64,
    #[serde(default)]
    pub mileage_km: f64,
    #[serde(default)]
    pub registration_month: u32,
    /// Age in years. Derived from the manufacturing year when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub car_age_years: Option<f64>,
    #[serde(default)]
    pub brand: String,
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub transmission_type: String,
    #[serde(default)]
    pub fuel_type: String,
}

impl Default for VehicleSpec {
    fn default() -> Self {
        Self {
            manufacturing_year: 2020.0,
            power_kw: 120.0,
            power_ps: 163.0,
            fuel_consumption_l_per_100km: 6.5,
            fuel_consumption_g_per_km: 120.0,
            mileage_km: 50_000.0,
            registration_month: 6,
            car_age_years: None,
            brand: "audi".to_string(),
            color: "black".to_string(),
            transmission_type: "manual".to_string(),
            fuel_type: "petrol".to_string(),
        }
    }
}

impl VehicleSpec {
    /// Copy of the spec with every non-finite numeric field replaced by zero.
    pub fn sanitized(&self) -> Self {
        Self {
            manufacturing_year: finite_or_zero(self.manufacturing_year),
            power_kw: finite_or_zero(self.power_kw),
            power_ps: finite_or_zero(self.power_ps),
            fuel_consumption_l_per_100km: finite_or_zero(self.fuel_consumption_l_per_100km),
            fuel_consumption_g_per_km: finite_or_zero(self.fuel_consumption_g_per_km),
            mileage_km: finite_or_zero(self.mileage_km),
            registration_month: self.registration_month,
            car_age_years: self.car_age_years.map(finite_or_zero),
            brand: self.brand.clone(),
            color: self.color.clone(),
            transmission_type: self.transmission_type.clone(),
            fuel_type: self.fuel_type.clone(),
        }
    }

    /// Age in years: the supplied value, or `current_year - manufacturing_year`.
    pub fn age_years(&self, current_year: i32) -> f64 {
        match self.car_age_years {
            Some(age) => finite_or_zero(age),
            None => f64::from(current_year) - finite_or_zero(self.manufacturing_year),
        }
    }

    /// Short human label, e.g. "AUDI 2020 163 PS".
    pub fn label(&self) -> String {
        format!(
            "{} {} {} PS",
            self.brand.to_uppercase(),
            self.manufacturing_year,
            self.power_ps
        )
    }
}

pub(crate) fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() {
        value
    } else {
        0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_wire_field_names() {
        let spec = VehicleSpec::default();
        let json = serde_json::to_value(&spec).unwrap();
        assert_eq!(json["manufacturingYear"], 2020.0);
        assert_eq!(json["fuelConsumptionLPer100Km"], 6.5);
        assert_eq!(json["fuelConsumptionGPerKm"], 120.0);
        assert_eq!(json["mileageKm"], 50000.0);
        assert_eq!(json["transmissionType"], "manual");
        assert!(json.get("carAgeYears").is_none());
    }

    #[test]
    fn test_missing_numeric_fields_are_zero() {
        let spec: VehicleSpec = serde_json::from_str(r#"{"brand": "bmw"}"#).unwrap();
        assert_eq!(spec.manufacturing_year, 0.0);
        assert_eq!(spec.mileage_km, 0.0);
        assert_eq!(spec.registration_month, 0);
        assert_eq!(spec.brand, "bmw");
    }

    #[test]
    fn test_sanitized_replaces_non_finite() {
        let spec = VehicleSpec {
            power_ps: f64::NAN,
            mileage_km: f64::INFINITY,
            car_age_years: Some(f64::NEG_INFINITY),
            ..VehicleSpec::default()
        };
        let clean = spec.sanitized();
        assert_eq!(clean.power_ps, 0.0);
        assert_eq!(clean.mileage_km, 0.0);
        assert_eq!(clean.car_age_years, Some(0.0));
        assert_eq!(clean.manufacturing_year, 2020.0);
    }

    #[test]
    fn test_age_years_supplied_or_derived() {
        let mut spec = VehicleSpec::default();
        assert_eq!(spec.age_years(2024), 4.0);
        spec.car_age_years = Some(3.0);
        assert_eq!(spec.age_years(2024), 3.0);
    }
}
