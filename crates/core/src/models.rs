use serde::{Deserialize, Serialize};

pub const ASK_FOR_PLACE_REPLY: &str =
    "Could you please specify the city or country you want the time for?";
pub const TIME_UNAVAILABLE_REPLY: &str = "Sorry, I couldn't determine the time for that location.";
pub const FALLBACK_REPLY: &str = "Thanks, but I'm still learning 😊";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Intent {
    BareTime,
    CityTime,
    Currency,
    Faq,
    Fallback,
}

impl Intent {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::BareTime => "bare_time",
            Self::CityTime => "city_time",
            Self::Currency => "currency",
            Self::Faq => "faq",
            Self::Fallback => "fallback",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FaqEntry {
    pub question: String,
    pub answer: String,
}

impl FaqEntry {
    pub fn new(question: impl Into<String>, answer: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            answer: answer.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FaqMatch {
    pub question: String,
    pub answer: String,
    pub score: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurrencyQuery {
    pub amount: f64,
    pub from: String,
    pub to: String,
}

impl CurrencyQuery {
    pub fn convert(&self, rate: f64) -> f64 {
        round_cents(self.amount * rate)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeQuery {
    pub city: String,
}

impl TimeQuery {
    pub fn display_city(&self) -> String {
        title_case(&self.city)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

/// Outcome of pattern classification, before any adapter is consulted.
#[derive(Debug, Clone, PartialEq)]
pub enum Route {
    BareTime,
    CityTime(TimeQuery),
    Currency(CurrencyQuery),
    Faq(FaqMatch),
    Fallback,
}

impl Route {
    pub fn intent(&self) -> Intent {
        match self {
            Self::BareTime => Intent::BareTime,
            Self::CityTime(_) => Intent::CityTime,
            Self::Currency(_) => Intent::Currency,
            Self::Faq(_) => Intent::Faq,
            Self::Fallback => Intent::Fallback,
        }
    }
}

/// Final answer for one utterance. Every variant renders to a single sentence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Reply {
    AskForPlace,
    LocalTime { city: String, timestamp: String },
    TimeUnavailable { city: String },
    Converted { query: CurrencyQuery, converted: f64 },
    RateUnavailable { from: String, to: String },
    Faq { question: String, answer: String, score: f64 },
    Fallback,
}

impl Reply {
    pub fn intent(&self) -> Intent {
        match self {
            Self::AskForPlace => Intent::BareTime,
            Self::LocalTime { .. } | Self::TimeUnavailable { .. } => Intent::CityTime,
            Self::Converted { .. } | Self::RateUnavailable { .. } => Intent::Currency,
            Self::Faq { .. } => Intent::Faq,
            Self::Fallback => Intent::Fallback,
        }
    }

    pub fn text(&self) -> String {
        match self {
            Self::AskForPlace => ASK_FOR_PLACE_REPLY.to_string(),
            Self::LocalTime { city, timestamp } => {
                format!("The current time in {city} is {timestamp}.")
            }
            Self::TimeUnavailable { .. } => TIME_UNAVAILABLE_REPLY.to_string(),
            Self::Converted { query, converted } => format!(
                "{} {} is equal to {} {} (Live Rate).",
                format_decimal(query.amount),
                query.from,
                format_decimal(*converted),
                query.to
            ),
            Self::RateUnavailable { from, to } => {
                format!("Sorry, I couldn't fetch the exchange rate for {from} to {to}.")
            }
            Self::Faq { answer, .. } => answer.clone(),
            Self::Fallback => FALLBACK_REPLY.to_string(),
        }
    }
}

/// Shortest round-trip rendering that always keeps a fractional part (`10.0`, `12.35`).
pub fn format_decimal(value: f64) -> String {
    format!("{value:?}")
}

/// Two-decimal rounding on the exact binary value, ties to even (`0.625` -> `0.62`).
pub fn round_cents(value: f64) -> f64 {
    format!("{value:.2}").parse::<f64>().unwrap_or(value)
}

/// Upper-cases the first letter of every alphabetic run and lower-cases the rest.
pub fn title_case(input: &str) -> String {
    let mut out = String::with_capacity(input.len());
    let mut previous_alpha = false;

    for ch in input.chars() {
        if previous_alpha {
            out.extend(ch.to_lowercase());
        } else {
            out.extend(ch.to_uppercase());
        }
        previous_alpha = ch.is_alphabetic();
    }

    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_cases_multi_word_cities() {
        assert_eq!(title_case("new york"), "New York");
        assert_eq!(title_case("são paulo"), "São Paulo");
        assert_eq!(title_case("rio-de-janeiro"), "Rio-De-Janeiro");
    }

    #[test]
    fn decimals_keep_a_fractional_digit() {
        assert_eq!(format_decimal(10.0), "10.0");
        assert_eq!(format_decimal(830.0), "830.0");
        assert_eq!(format_decimal(12.35), "12.35");
    }

    #[test]
    fn conversion_rounds_to_cents() {
        let query = CurrencyQuery {
            amount: 3.0,
            from: "USD".to_string(),
            to: "EUR".to_string(),
        };
        assert_eq!(query.convert(0.91234), 2.74);

        let query = CurrencyQuery {
            amount: 5.0,
            from: "USD".to_string(),
            to: "EUR".to_string(),
        };
        assert_eq!(query.convert(0.125), 0.62);
        assert_eq!(round_cents(0.125), 0.12);
        assert_eq!(round_cents(2.0 * 1.3125), 2.62);
        assert!(round_cents(f64::NAN).is_nan());
    }

    #[test]
    fn converted_reply_renders_live_rate_sentence() {
        let reply = Reply::Converted {
            query: CurrencyQuery {
                amount: 10.0,
                from: "USD".to_string(),
                to: "INR".to_string(),
            },
            converted: 830.0,
        };
        assert_eq!(
            reply.text(),
            "10.0 USD is equal to 830.0 INR (Live Rate)."
        );
        assert_eq!(reply.intent(), Intent::Currency);
    }
}
