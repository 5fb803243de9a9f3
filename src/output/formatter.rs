use chrono::{Duration, Utc};
use owo_colors::OwoColorize;
use std::io::IsTerminal;
use terminal_size::{terminal_size, Width};

use crate::history::HistoryEntry;
use crate::pricing::{
    factor_hints, Confidence, Estimate, EstimateSource, FactorName, BASE_PRICE, MARKET_AVERAGE,
};
use crate::recommend::{CompareSelection, RankedListing};
use crate::vehicle::{ValidationWarning, VehicleSpec};

/// Check if stdout is a TTY (for auto-detecting color support)
pub fn should_use_colors() -> bool {
    std::io::stdout().is_terminal()
}

/// Group whole units in threes: 1234567.0 -> "1,234,567"
fn group_thousands(value: f64) -> String {
    let rounded = value.round();
    if !rounded.is_finite() {
        return value.to_string();
    }
    let digits = format!("{:.0}", rounded.abs());
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    if rounded < 0.0 {
        format!("-{}", out)
    } else {
        out
    }
}

/// Format an amount in whole euros: "€36,050", "-€2,500"
pub fn format_price(value: f64) -> String {
    let rounded = value.round();
    if rounded < 0.0 {
        format!("-€{}", group_thousands(-rounded))
    } else {
        format!("€{}", group_thousands(rounded))
    }
}

/// Format a signed contribution: "+€10,000", "-€4,500", "€0"
pub fn format_signed_price(value: f64) -> String {
    let rounded = value.round();
    if rounded > 0.0 {
        format!("+{}", format_price(rounded))
    } else if rounded < 0.0 {
        format_price(rounded)
    } else {
        "€0".to_string()
    }
}

/// Format a listing's distance from the estimate. Zero renders as "≈".
pub fn format_delta(delta: f64) -> String {
    if delta.round() == 0.0 {
        "≈".to_string()
    } else {
        format_signed_price(delta)
    }
}

fn confidence_badge(confidence: Confidence, use_colors: bool) -> String {
    let text = format!("{} Confidence", confidence);
    if !use_colors {
        return text;
    }
    match confidence {
        Confidence::High => text.green().to_string(),
        Confidence::Medium => text.yellow().to_string(),
        Confidence::Low => text.red().to_string(),
    }
}

/// Headline block for an estimate: price, confidence, origin and market position
pub fn format_estimate(estimate: &Estimate, use_colors: bool) -> String {
    let price = format_price(estimate.predicted_price);
    let source = match estimate.source {
        EstimateSource::Local => "local model",
        EstimateSource::Service => "prediction service",
    };

    let position = format!(
        "  Market position: {} ({} average)",
        estimate.market_position(),
        format_price(MARKET_AVERAGE)
    );

    if use_colors {
        format!(
            "Estimated value: {}\n  {}  ({})\n{}",
            price.bold(),
            confidence_badge(estimate.confidence, true),
            source.dimmed(),
            position
        )
    } else {
        format!(
            "Estimated value: {}\n  {}  ({})\n{}",
            price,
            confidence_badge(estimate.confidence, false),
            source,
            position
        )
    }
}

/// Per-factor contributions, one per line.
///
/// When the local raw price went negative the factors no longer add up to
/// the floored price; that is called out instead of hidden.
pub fn format_breakdown(estimate: &Estimate, use_colors: bool) -> String {
    let mut lines = Vec::new();
    lines.push("Factors affecting price:".to_string());

    if estimate.source == EstimateSource::Local {
        lines.push(format!("  {:<16}{:>12}", "Base price", format_price(BASE_PRICE)));
    }

    for (key, value) in estimate.factors.entries() {
        let label = FactorName::ALL
            .iter()
            .find(|name| name.key() == key)
            .map(|name| name.label().to_string())
            .unwrap_or_else(|| capitalize(&key));
        let amount = format!("{:>12}", format_signed_price(value));
        let amount = if !use_colors {
            amount
        } else if value > 0.0 {
            amount.green().to_string()
        } else if value < 0.0 {
            amount.red().to_string()
        } else {
            amount
        };
        lines.push(format!("  {:<16}{}", label, amount));
    }

    if estimate.is_floored() {
        let raw = estimate.raw_price.unwrap_or_default();
        let note = format!(
            "  Note: factors sum to {}; the price is floored at {}.",
            format_price(raw),
            format_price(0.0)
        );
        lines.push(if use_colors {
            note.yellow().to_string()
        } else {
            note
        });
    }

    lines.join("\n")
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// Quick good/bad read of the main attributes
pub fn format_hints(spec: &VehicleSpec) -> String {
    factor_hints(spec)
        .iter()
        .map(|hint| {
            let mark = if hint.positive { "✅" } else { "❌" };
            let detail = match hint.factor {
                FactorName::Mileage => {
                    format!("{} km", group_thousands(spec.mileage_km))
                }
                FactorName::Year => format!("{}", spec.manufacturing_year),
                FactorName::Fuel => format!("{}L/100km", spec.fuel_consumption_l_per_100km),
                FactorName::Power => format!("{} PS", spec.power_ps),
                FactorName::Age => String::new(),
            };
            format!("  {} {}: {}", mark, hint.factor.label(), detail)
        })
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn format_warnings(warnings: &[ValidationWarning], use_colors: bool) -> String {
    warnings
        .iter()
        .map(|w| {
            let line = format!("warning: {}", w);
            if use_colors {
                line.yellow().to_string()
            } else {
                line
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Get terminal width, defaulting to None for pipes (unlimited)
fn get_terminal_width() -> Option<usize> {
    terminal_size().map(|(Width(w), _)| w as usize)
}

/// Truncate text to fit available width, accounting for Unicode
fn truncate_text(text: &str, max_width: usize) -> String {
    let chars: Vec<char> = text.chars().collect();
    if chars.len() <= max_width {
        text.to_string()
    } else if max_width > 3 {
        format!("{}...", chars[..max_width - 3].iter().collect::<String>())
    } else {
        chars[..max_width].iter().collect()
    }
}

fn listing_details(ranked: &RankedListing) -> String {
    let listing = &ranked.listing;
    let mut parts = vec![listing.headline()];
    if let Some(ps) = listing.power_ps {
        parts.push(format!("{} PS", ps));
    }
    if let Some(ref transmission) = listing.transmission_type {
        parts.push(transmission.clone());
    }
    if let Some(ref fuel) = listing.fuel_type {
        parts.push(fuel.clone());
    }
    if let Some(km) = listing.mileage_km {
        parts.push(format!("{} km", group_thousands(km)));
    }
    parts.join(" • ")
}

/// Format ranked listings as a table: Index, Score, Price, Delta, Details, Id.
/// Listings in the compare selection are marked with `*`.
pub fn format_ranked_table(
    ranked: &[RankedListing],
    selection: &CompareSelection,
    use_colors: bool,
) -> String {
    if ranked.is_empty() {
        return "No comparable listings found.".to_string();
    }

    let term_width = get_terminal_width();
    let index_width = 4;
    let score_width = 5;
    let price_width = 10;
    let delta_width = 10;
    let separator = "  ";

    ranked
        .iter()
        .enumerate()
        .map(|(idx, r)| {
            let marker = if selection.contains(&r.listing.id) { "*" } else { " " };
            let index_str = format!("{}{:>2}.", marker, idx + 1);
            let score_str = format!(
                "{:>width$}",
                r.listing
                    .match_score
                    .map(|s| format!("{:.0}", s))
                    .unwrap_or_else(|| "-".to_string()),
                width = score_width
            );
            let price_str = format!(
                "{:>width$}",
                r.listing
                    .price_in_euro
                    .map(format_price)
                    .unwrap_or_else(|| "-".to_string()),
                width = price_width
            );
            let delta_str = format!("{:>width$}", format_delta(r.price_delta), width = delta_width);
            let id_str = format!("#{}", r.listing.id);

            let fixed_width = index_width
                + score_width
                + price_width
                + delta_width
                + id_str.chars().count()
                + separator.len() * 5;
            let details = listing_details(r);
            let details = match term_width {
                Some(width) if width > fixed_width + 10 => truncate_text(&details, width - fixed_width),
                Some(_) => truncate_text(&details, 20),
                None => details,
            };

            if use_colors {
                let delta_colored = if r.price_delta > 0.0 {
                    delta_str.red().to_string()
                } else if r.price_delta < 0.0 {
                    delta_str.green().to_string()
                } else {
                    delta_str.dimmed().to_string()
                };
                format!(
                    "{}{}{}{}{}{}{}{}{}{}{}",
                    index_str.dimmed(),
                    separator,
                    score_str.bold(),
                    separator,
                    price_str,
                    separator,
                    delta_colored,
                    separator,
                    details,
                    separator,
                    id_str.underline()
                )
            } else {
                format!(
                    "{}{}{}{}{}{}{}{}{}{}{}",
                    index_str,
                    separator,
                    score_str,
                    separator,
                    price_str,
                    separator,
                    delta_str,
                    separator,
                    details,
                    separator,
                    id_str
                )
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Format ranked listings as tab-separated values for scripting
/// Columns: id, match_score, price_in_euro, price_delta (no headers, no colors)
pub fn format_ranked_tsv(ranked: &[RankedListing]) -> String {
    ranked
        .iter()
        .map(|r| {
            format!(
                "{}\t{}\t{}\t{}",
                r.listing.id,
                r.listing.match_score.map(|s| s.to_string()).unwrap_or_default(),
                r.listing.price_in_euro.map(|p| p.to_string()).unwrap_or_default(),
                r.price_delta
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}

/// Side-by-side view of exactly two listings. Returns None otherwise.
pub fn format_compare(picked: &[&RankedListing], use_colors: bool) -> Option<String> {
    let [left, right] = picked else {
        return None;
    };

    fn text(value: Option<String>) -> String {
        value.unwrap_or_else(|| "-".to_string())
    }

    let rows: Vec<(&str, String, String)> = vec![
        ("Listing", format!("#{}", left.listing.id), format!("#{}", right.listing.id)),
        ("Vehicle", left.listing.headline(), right.listing.headline()),
        (
            "Price",
            text(left.listing.price_in_euro.map(format_price)),
            text(right.listing.price_in_euro.map(format_price)),
        ),
        ("vs estimate", format_delta(left.price_delta), format_delta(right.price_delta)),
        (
            "Mileage",
            text(left.listing.mileage_km.map(|km| format!("{} km", group_thousands(km)))),
            text(right.listing.mileage_km.map(|km| format!("{} km", group_thousands(km)))),
        ),
        (
            "Power",
            text(left.listing.power_ps.map(|ps| format!("{} PS", ps))),
            text(right.listing.power_ps.map(|ps| format!("{} PS", ps))),
        ),
        (
            "Transmission",
            text(left.listing.transmission_type.clone()),
            text(right.listing.transmission_type.clone()),
        ),
        ("Fuel", text(left.listing.fuel_type.clone()), text(right.listing.fuel_type.clone())),
        (
            "Match",
            text(left.listing.match_score.map(|s| format!("{:.0}", s))),
            text(right.listing.match_score.map(|s| format!("{:.0}", s))),
        ),
    ];

    let header = if use_colors {
        "Compare".bold().to_string()
    } else {
        "Compare".to_string()
    };

    let body = rows
        .iter()
        .map(|(label, l, r)| format!("  {:<14}{:<24}{}", label, l, r))
        .collect::<Vec<_>>()
        .join("\n");

    Some(format!("{}\n{}", header, body))
}

/// Format a duration into a human-readable age string
/// "2h" for hours, "3d" for days, "1w" for weeks
pub fn format_age(duration: Duration) -> String {
    let hours = duration.num_hours();
    let days = duration.num_days();
    let weeks = days / 7;

    if weeks >= 1 {
        format!("{}w", weeks)
    } else if days >= 1 {
        format!("{}d", days)
    } else if hours >= 1 {
        format!("{}h", hours)
    } else {
        let minutes = duration.num_minutes();
        if minutes >= 1 {
            format!("{}m", minutes)
        } else {
            "now".to_string()
        }
    }
}

/// Past estimates, newest first
pub fn format_history(entries: &[HistoryEntry], use_colors: bool) -> String {
    if entries.is_empty() {
        return "No past estimates.".to_string();
    }

    let now = Utc::now();
    entries
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index_str = format!("{:>2}.", idx + 1);
            let age = format!("{:>4}", format_age(now - entry.timestamp));
            let price = format!("{:>10}", format_price(entry.output_estimate.predicted_price));
            let spec = &entry.input_spec;
            let summary = format!(
                "{} • {} km • {}",
                spec.label(),
                group_thousands(spec.mileage_km),
                spec.fuel_type
            );
            if use_colors {
                format!(
                    "{} {}  {}  {}",
                    index_str.dimmed(),
                    age.dimmed(),
                    price.bold(),
                    summary
                )
            } else {
                format!("{} {}  {}  {}", index_str, age, price, summary)
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pricing::FactorModel;
    use crate::recommend::{rank, CandidateListing, SortKey};

    fn listing(id: &str, score: f64, price: f64) -> CandidateListing {
        CandidateListing {
            id: id.to_string(),
            brand: Some("bmw".to_string()),
            year: Some(2019.0),
            power_ps: Some(190.0),
            transmission_type: Some("automatic".to_string()),
            fuel_type: Some("diesel".to_string()),
            mileage_km: Some(61_000.0),
            price_in_euro: Some(price),
            match_score: Some(score),
        }
    }

    #[test]
    fn test_group_thousands() {
        assert_eq!(group_thousands(0.0), "0");
        assert_eq!(group_thousands(999.0), "999");
        assert_eq!(group_thousands(1_000.0), "1,000");
        assert_eq!(group_thousands(1_234_566.6), "1,234,567");
        assert_eq!(group_thousands(-50_000.0), "-50,000");
        assert_eq!(group_thousands(-0.2), "0");
    }

    #[test]
    fn test_format_price() {
        assert_eq!(format_price(36_050.0), "€36,050");
        assert_eq!(format_price(-2_500.0), "-€2,500");
        assert_eq!(format_price(0.0), "€0");
        assert_eq!(format_price(-0.4), "€0");
    }

    #[test]
    fn test_format_price_beyond_integer_range() {
        assert_eq!(format_price(1e19), "€10,000,000,000,000,000,000");
        assert_eq!(format_price(-1e19), "-€10,000,000,000,000,000,000");
        assert_eq!(format_signed_price(-1e19), "-€10,000,000,000,000,000,000");
        assert_eq!(format_price(f64::MAX).chars().filter(|c| *c == ',').count(), 102);
    }

    #[test]
    fn test_format_breakdown_huge_mileage() {
        let spec = VehicleSpec {
            mileage_km: 1e30,
            ..VehicleSpec::default()
        };
        let estimate = FactorModel::new(2024).estimate(&spec);
        let result = format_breakdown(&estimate, false);
        assert!(result.contains("-€50,000,000,000"));
        assert!(result.contains("floored"));
        assert_eq!(format_estimate(&estimate, false).lines().next(), Some("Estimated value: €0"));
    }

    #[test]
    fn test_format_delta() {
        assert_eq!(format_delta(0.0), "≈");
        assert_eq!(format_delta(1_000.0), "+€1,000");
        assert_eq!(format_delta(-1_500.0), "-€1,500");
    }

    #[test]
    fn test_format_estimate() {
        let spec = VehicleSpec {
            car_age_years: Some(3.0),
            ..VehicleSpec::default()
        };
        let estimate = FactorModel::new(2024).estimate(&spec);
        let result = format_estimate(&estimate, false);
        assert!(result.contains("€36,050"));
        assert!(result.contains("High Confidence"));
        assert!(result.contains("local model"));
        assert!(result.contains("Market position: Above Average (€25,000 average)"));
    }

    #[test]
    fn test_format_breakdown() {
        let spec = VehicleSpec {
            car_age_years: Some(3.0),
            ..VehicleSpec::default()
        };
        let estimate = FactorModel::new(2024).estimate(&spec);
        let result = format_breakdown(&estimate, false);
        assert!(result.contains("Base price"));
        assert!(result.contains("+€10,000"));
        assert!(result.contains("-€2,500"));
        assert!(result.contains("-€4,500"));
        assert!(!result.contains("floored"));
    }

    #[test]
    fn test_format_breakdown_calls_out_floor() {
        let spec = VehicleSpec {
            manufacturing_year: 1990.0,
            mileage_km: 400_000.0,
            power_ps: 70.0,
            fuel_consumption_l_per_100km: 15.0,
            car_age_years: Some(30.0),
            ..VehicleSpec::default()
        };
        let estimate = FactorModel::new(2024).estimate(&spec);
        let result = format_breakdown(&estimate, false);
        assert!(result.contains("floored at €0"));
    }

    #[test]
    fn test_format_breakdown_extra_factor() {
        let mut estimate = FactorModel::new(2024).estimate(&VehicleSpec::default());
        estimate.source = EstimateSource::Service;
        estimate.factors.other.insert("brand".to_string(), 7_500.0);
        let result = format_breakdown(&estimate, false);
        assert!(result.contains("Brand"));
        assert!(!result.contains("Base price"));
    }

    #[test]
    fn test_format_hints() {
        let result = format_hints(&VehicleSpec::default());
        assert!(result.contains("✅ Mileage: 50,000 km"));
        assert!(result.contains("Power: 163 PS"));
        assert!(!result.contains("❌"));
    }

    #[test]
    fn test_format_ranked_table_empty() {
        let result = format_ranked_table(&[], &CompareSelection::new(), false);
        assert_eq!(result, "No comparable listings found.");
    }

    #[test]
    fn test_format_ranked_table_marks_selection() {
        let ranked = rank(
            &[listing("1", 90.0, 26_000.0), listing("2", 40.0, 25_000.0)],
            Some(25_000.0),
            SortKey::Score,
        );
        let selection = CompareSelection::new().toggle("2");
        let result = format_ranked_table(&ranked, &selection, false);
        let lines: Vec<&str> = result.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("  1."));
        assert!(lines[0].contains("+€1,000"));
        assert!(lines[0].ends_with("#1"));
        assert!(lines[1].starts_with("* 2."));
        assert!(lines[1].contains("≈"));
    }

    #[test]
    fn test_format_ranked_tsv() {
        let ranked = rank(&[listing("7", 55.0, 20_000.0)], Some(21_000.0), SortKey::Price);
        assert_eq!(format_ranked_tsv(&ranked), "7\t55\t20000\t-1000");
    }

    #[test]
    fn test_format_compare_needs_two() {
        let ranked = rank(
            &[listing("a", 90.0, 26_000.0), listing("b", 40.0, 24_000.0)],
            Some(25_000.0),
            SortKey::Score,
        );
        let one: Vec<&RankedListing> = ranked.iter().take(1).collect();
        assert!(format_compare(&one, false).is_none());

        let both: Vec<&RankedListing> = ranked.iter().collect();
        let result = format_compare(&both, false).unwrap();
        assert!(result.contains("#a"));
        assert!(result.contains("#b"));
        assert!(result.contains("-€1,000"));
    }

    #[test]
    fn test_format_age() {
        assert_eq!(format_age(Duration::seconds(30)), "now");
        assert_eq!(format_age(Duration::minutes(5)), "5m");
        assert_eq!(format_age(Duration::hours(3)), "3h");
        assert_eq!(format_age(Duration::days(2)), "2d");
        assert_eq!(format_age(Duration::weeks(3)), "3w");
    }

    #[test]
    fn test_format_history() {
        assert_eq!(format_history(&[], false), "No past estimates.");

        let spec = VehicleSpec::default();
        let estimate = FactorModel::new(2024).estimate(&spec);
        let entries = crate::history::record(&[], &spec, &estimate);
        let result = format_history(&entries, false);
        assert!(result.starts_with(" 1."));
        assert!(result.contains("AUDI 2020 163 PS"));
        assert!(result.contains("50,000 km"));
    }
}
