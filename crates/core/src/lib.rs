pub mod faq;
pub mod fuzzy;
pub mod intent;
pub mod models;

pub use faq::{FaqTable, DEFAULT_FAQ_THRESHOLD};
pub use intent::{
    classify, is_bare_time_query, normalize_utterance, parse_currency_query, parse_time_query,
    ROUTE_ORDER,
};
pub use models::*;
