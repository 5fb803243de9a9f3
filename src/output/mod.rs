pub mod formatter;

pub use formatter::{
    format_age, format_breakdown, format_compare, format_delta, format_estimate, format_hints,
    format_history, format_price, format_ranked_table, format_ranked_tsv, format_warnings,
    should_use_colors,
};
