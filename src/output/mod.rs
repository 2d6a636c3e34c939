pub mod formatter;

pub use formatter::{
    format_age, format_entity_detail, format_net_worth, format_ranked_table, format_score,
    format_skipped, format_tsv, format_weight, format_weights, should_use_colors, RankedRow,
};
