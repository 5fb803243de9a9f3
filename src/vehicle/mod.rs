pub mod catalog;
pub mod types;
pub mod validation;

pub use catalog::{CategoricalField, OptionsCatalog};
pub use types::VehicleSpec;
pub use validation::{validate_spec, ValidationWarning};
