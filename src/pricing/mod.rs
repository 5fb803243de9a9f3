pub mod engine;
pub mod factors;

pub use engine::{
    Confidence, Estimate, EstimateSource, FactorModel, MarketPosition, BASE_PRICE, MARKET_AVERAGE,
};
pub use factors::{factor_hints, FactorBreakdown, FactorHint, FactorName};
