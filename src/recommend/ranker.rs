use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use super::types::CandidateListing;

/// Ordering applied to a recommendation list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortKey {
    /// Match score, highest first.
    #[default]
    Score,
    /// Listing price, cheapest first.
    Price,
    /// Distance from the estimate, closest first.
    Delta,
}

impl FromStr for SortKey {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "score" => Ok(SortKey::Score),
            "price" => Ok(SortKey::Price),
            "delta" => Ok(SortKey::Delta),
            other => Err(format!(
                "unknown sort key '{}' (expected score, price or delta)",
                other
            )),
        }
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SortKey::Score => "score",
            SortKey::Price => "price",
            SortKey::Delta => "delta",
        };
        write!(f, "{}", s)
    }
}

/// A candidate annotated with its distance from the target price.
#[derive(Debug, Clone, PartialEq)]
pub struct RankedListing {
    pub listing: CandidateListing,
    /// `price_in_euro - target`, or 0 when either side is unknown.
    pub price_delta: f64,
}

/// Order candidates against a target price.
///
/// The sort is stable: equal keys keep their input order. Duplicate ids are
/// not collapsed.
pub fn rank(
    candidates: &[CandidateListing],
    target_price: Option<f64>,
    sort_key: SortKey,
) -> Vec<RankedListing> {
    let mut ranked: Vec<RankedListing> = candidates
        .iter()
        .map(|listing| RankedListing {
            price_delta: price_delta(listing, target_price),
            listing: listing.clone(),
        })
        .collect();

    ranked.sort_by(|a, b| compare(a, b, sort_key));
    ranked
}

fn compare(a: &RankedListing, b: &RankedListing, sort_key: SortKey) -> Ordering {
    match sort_key {
        SortKey::Score => value_or_zero(b.listing.match_score)
            .total_cmp(&value_or_zero(a.listing.match_score)),
        SortKey::Price => value_or_zero(a.listing.price_in_euro)
            .total_cmp(&value_or_zero(b.listing.price_in_euro)),
        SortKey::Delta => a.price_delta.abs().total_cmp(&b.price_delta.abs()),
    }
}

fn price_delta(listing: &CandidateListing, target_price: Option<f64>) -> f64 {
    match (known(listing.price_in_euro), known(target_price)) {
        (Some(price), Some(target)) => price - target,
        _ => 0.0,
    }
}

fn known(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

fn value_or_zero(value: Option<f64>) -> f64 {
    known(value).unwrap_or(0.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn listing(id: &str, score: Option<f64>, price: Option<f64>) -> CandidateListing {
        CandidateListing {
            id: id.to_string(),
            brand: Some("audi".to_string()),
            year: Some(2019.0),
            power_ps: Some(150.0),
            transmission_type: Some("manual".to_string()),
            fuel_type: Some("petrol".to_string()),
            mileage_km: Some(40_000.0),
            price_in_euro: price,
            match_score: score,
        }
    }

    fn ids(ranked: &[RankedListing]) -> Vec<&str> {
        ranked.iter().map(|r| r.listing.id.as_str()).collect()
    }

    #[test]
    fn test_sort_by_score_descending() {
        let candidates = vec![
            listing("a", Some(40.0), None),
            listing("b", Some(90.0), None),
            listing("c", Some(70.0), None),
        ];
        let ranked = rank(&candidates, Some(25_000.0), SortKey::Score);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_price_ascending() {
        let candidates = vec![
            listing("a", None, Some(30_000.0)),
            listing("b", None, Some(20_000.0)),
            listing("c", None, Some(25_000.0)),
        ];
        let ranked = rank(&candidates, Some(25_000.0), SortKey::Price);
        assert_eq!(ids(&ranked), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_sort_by_absolute_delta() {
        let candidates = vec![
            listing("far-below", None, Some(10_000.0)),
            listing("near-above", None, Some(26_000.0)),
            listing("near-below", None, Some(23_500.0)),
        ];
        let ranked = rank(&candidates, Some(25_000.0), SortKey::Delta);
        assert_eq!(ids(&ranked), vec!["near-above", "near-below", "far-below"]);
        assert_eq!(ranked[0].price_delta, 1_000.0);
        assert_eq!(ranked[1].price_delta, -1_500.0);
    }

    #[test]
    fn test_score_ties_keep_input_order() {
        let candidates = vec![
            listing("first", Some(50.0), None),
            listing("top", Some(80.0), None),
            listing("second", Some(50.0), None),
            listing("third", Some(50.0), None),
        ];
        let ranked = rank(&candidates, None, SortKey::Score);
        assert_eq!(ids(&ranked), vec!["top", "first", "second", "third"]);
    }

    #[test]
    fn test_missing_values_treated_as_zero() {
        let candidates = vec![
            listing("none", None, None),
            listing("some", Some(10.0), Some(5_000.0)),
        ];
        assert_eq!(ids(&rank(&candidates, None, SortKey::Score)), vec!["some", "none"]);
        assert_eq!(ids(&rank(&candidates, None, SortKey::Price)), vec!["none", "some"]);
    }

    #[test]
    fn test_delta_zero_when_price_or_target_absent() {
        let candidates = vec![listing("a", None, None), listing("b", None, Some(9_000.0))];
        let ranked = rank(&candidates, Some(10_000.0), SortKey::Score);
        assert_eq!(ranked[0].price_delta, 0.0);
        assert_eq!(ranked[1].price_delta, -1_000.0);

        let untargeted = rank(&candidates, None, SortKey::Score);
        assert!(untargeted.iter().all(|r| r.price_delta == 0.0));
    }

    #[test]
    fn test_duplicate_ids_are_kept() {
        let candidates = vec![listing("x", Some(1.0), None), listing("x", Some(2.0), None)];
        assert_eq!(rank(&candidates, None, SortKey::Score).len(), 2);
    }

    #[test]
    fn test_empty_input() {
        assert!(rank(&[], Some(1.0), SortKey::Delta).is_empty());
    }

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("Price".parse::<SortKey>().unwrap(), SortKey::Price);
        assert_eq!(SortKey::default(), SortKey::Score);
        assert!("newest".parse::<SortKey>().is_err());
    }

    proptest! {
        #[test]
        fn prop_score_ranking_is_idempotent(
            scores in proptest::collection::vec(proptest::option::of(0.0f64..=100.0), 0..30),
        ) {
            let candidates: Vec<_> = scores
                .iter()
                .enumerate()
                .map(|(i, s)| listing(&i.to_string(), *s, Some(20_000.0)))
                .collect();
            let once = rank(&candidates, Some(20_000.0), SortKey::Score);
            let sorted: Vec<_> = once.iter().map(|r| r.listing.clone()).collect();
            let twice = rank(&sorted, Some(20_000.0), SortKey::Score);
            prop_assert_eq!(once, twice);
        }
    }
}
