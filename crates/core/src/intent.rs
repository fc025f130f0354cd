use once_cell::sync::Lazy;
use regex::Regex;

use crate::faq::FaqTable;
use crate::models::{CurrencyQuery, Intent, Route, TimeQuery};

/// Matchers are tried in this order; the first one that accepts the utterance wins.
pub const ROUTE_ORDER: [Intent; 4] = [
    Intent::BareTime,
    Intent::CityTime,
    Intent::Currency,
    Intent::Faq,
];

static BARE_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:what time is it|what's the time|time now|current time)$")
        .expect("valid bare time regex")
});

static CITY_TIME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:time in|what time is it in|current time in)\s+([\w\s]+)")
        .expect("valid city time regex")
});

static CURRENCY: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d+(?:\.\d+)?)\s*([A-Za-z₹$€£]+)\s*(?:into|to|in)\s*([A-Za-z₹$€£]+)")
        .expect("valid currency regex")
});

pub fn normalize_utterance(input: &str) -> String {
    input.trim().to_lowercase()
}

pub fn classify(normalized: &str, faqs: &FaqTable) -> Route {
    ROUTE_ORDER
        .iter()
        .find_map(|intent| match_intent(*intent, normalized, faqs))
        .unwrap_or(Route::Fallback)
}

fn match_intent(intent: Intent, text: &str, faqs: &FaqTable) -> Option<Route> {
    match intent {
        Intent::BareTime => is_bare_time_query(text).then_some(Route::BareTime),
        Intent::CityTime => parse_time_query(text).map(Route::CityTime),
        Intent::Currency => parse_currency_query(text).map(Route::Currency),
        Intent::Faq => faqs.best_match(text).map(Route::Faq),
        Intent::Fallback => Some(Route::Fallback),
    }
}

pub fn is_bare_time_query(text: &str) -> bool {
    BARE_TIME.is_match(text)
}

pub fn parse_time_query(text: &str) -> Option<TimeQuery> {
    let captures = CITY_TIME.captures(text)?;
    let city = captures.get(1)?.as_str().trim();
    if city.is_empty() {
        return None;
    }

    Some(TimeQuery {
        city: city.to_string(),
    })
}

pub fn parse_currency_query(text: &str) -> Option<CurrencyQuery> {
    let captures = CURRENCY.captures(text)?;
    let amount = captures.get(1)?.as_str().parse::<f64>().ok()?;

    Some(CurrencyQuery {
        amount,
        from: currency_code(captures.get(2)?.as_str()),
        to: currency_code(captures.get(3)?.as_str()),
    })
}

fn currency_code(token: &str) -> String {
    let upper = token.to_uppercase();
    match upper.as_str() {
        "$" => "USD".to_string(),
        "₹" => "INR".to_string(),
        "€" => "EUR".to_string(),
        "£" => "GBP".to_string(),
        _ => upper,
    }
}
