use serde::{Deserialize, Serialize};

/// Valid values for each categorical vehicle attribute.
///
/// Served by the backend's options endpoint. When that is unreachable the
/// built-in [`OptionsCatalog::fallback`] is used instead.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OptionsCatalog {
    #[serde(default)]
    pub brands: Vec<String>,
    #[serde(default)]
    pub colors: Vec<String>,
    #[serde(default)]
    pub transmission_types: Vec<String>,
    #[serde(default)]
    pub fuel_types: Vec<String>,
}

/// The categorical attribute a catalog list belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CategoricalField {
    Brand,
    Color,
    TransmissionType,
    FuelType,
}

impl CategoricalField {
    pub fn name(self) -> &'static str {
        match self {
            CategoricalField::Brand => "brand",
            CategoricalField::Color => "color",
            CategoricalField::TransmissionType => "transmissionType",
            CategoricalField::FuelType => "fuelType",
        }
    }
}

impl Default for OptionsCatalog {
    fn default() -> Self {
        Self::fallback()
    }
}

impl OptionsCatalog {
    pub fn fallback() -> Self {
        fn owned(values: &[&str]) -> Vec<String> {
            values.iter().map(|v| v.to_string()).collect()
        }

        Self {
            brands: owned(&[
                "audi", "bmw", "ford", "hyundai", "kia", "fiat", "citroen", "dacia", "land-rover",
                "mazda",
            ]),
            colors: owned(&[
                "black", "grey", "white", "blue", "silver", "red", "brown", "green", "orange",
                "yellow",
            ]),
            transmission_types: owned(&["manual", "automatic", "semi-automatic"]),
            fuel_types: owned(&[
                "petrol", "diesel", "electric", "hybrid", "lpg", "ethanol", "hydrogen", "other",
                "unknown",
            ]),
        }
    }

    pub fn values(&self, field: CategoricalField) -> &[String] {
        match field {
            CategoricalField::Brand => &self.brands,
            CategoricalField::Color => &self.colors,
            CategoricalField::TransmissionType => &self.transmission_types,
            CategoricalField::FuelType => &self.fuel_types,
        }
    }

    /// Case-insensitive membership test.
    pub fn contains(&self, field: CategoricalField, value: &str) -> bool {
        self.values(field)
            .iter()
            .any(|v| v.eq_ignore_ascii_case(value.trim()))
    }

    /// A catalog with any empty list is treated as incomplete by callers.
    pub fn is_complete(&self) -> bool {
        !self.brands.is_empty()
            && !self.colors.is_empty()
            && !self.transmission_types.is_empty()
            && !self.fuel_types.is_empty()
    }
}
