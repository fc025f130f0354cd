use std::sync::Arc;
use std::time::Instant;

use chrono::Utc;
use deskmate_adapters::{format_local_time, AdapterError, Adapters};
use deskmate_core::{
    classify, normalize_utterance, CurrencyQuery, FaqTable, Reply, Route, TimeQuery,
};
use deskmate_ml::LazyModel;
use deskmate_observability::AppMetrics;
use serde::Serialize;
use tracing::{info, instrument, warn};

pub const NO_DOCUMENT_ANSWER: &str = "Sorry, I couldn't find an answer to that in the document.";

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DocumentAnswer {
    pub response: String,
    pub score: f32,
}

impl DocumentAnswer {
    fn unanswered() -> Self {
        Self {
            response: NO_DOCUMENT_ANSWER.to_string(),
            score: 0.0,
        }
    }
}

/// Answers chat utterances: classify first, then consult whichever adapter the route needs.
#[derive(Clone)]
pub struct Assistant {
    faqs: Arc<FaqTable>,
    adapters: Adapters,
    model: Arc<LazyModel>,
    metrics: Arc<AppMetrics>,
}

impl Assistant {
    pub fn new(
        faqs: FaqTable,
        adapters: Adapters,
        model: LazyModel,
        metrics: Arc<AppMetrics>,
    ) -> Self {
        Self {
            faqs: Arc::new(faqs),
            adapters,
            model: Arc::new(model),
            metrics,
        }
    }

    pub fn faqs(&self) -> &FaqTable {
        &self.faqs
    }

    pub fn model(&self) -> &LazyModel {
        &self.model
    }

    pub fn metrics(&self) -> &Arc<AppMetrics> {
        &self.metrics
    }

    #[instrument(skip(self, question))]
    pub async fn ask(&self, question: &str) -> Reply {
        let started = Instant::now();
        self.metrics.inc_request();

        let normalized = normalize_utterance(question);
        let route = classify(&normalized, &self.faqs);
        let reply = self.dispatch(route).await;

        let intent = reply.intent();
        self.metrics.inc_intent(intent);
        self.metrics.observe_latency(started.elapsed());
        info!(
            intent = intent.as_str(),
            latency_ms = started.elapsed().as_millis() as u64,
            "question routed"
        );

        reply
    }

    pub fn ask_document(&self, question: &str, document_text: &str) -> DocumentAnswer {
        let model = match self.model.get() {
            Ok(model) => model,
            Err(err) => {
                warn!(error = %err, "QA model unavailable");
                return DocumentAnswer::unanswered();
            }
        };

        self.metrics.inc_qa_inference();
        match model.answer(question.trim(), document_text) {
            Some(answer) => {
                info!(model = model.model_name(), score = answer.score, "document answered");
                DocumentAnswer {
                    response: answer.answer,
                    score: answer.score,
                }
            }
            None => DocumentAnswer::unanswered(),
        }
    }

    async fn dispatch(&self, route: Route) -> Reply {
        match route {
            Route::BareTime => Reply::AskForPlace,
            Route::CityTime(query) => self.local_time(query).await,
            Route::Currency(query) => self.convert(query).await,
            Route::Faq(found) => Reply::Faq {
                question: found.question,
                answer: found.answer,
                score: found.score,
            },
            Route::Fallback => Reply::Fallback,
        }
    }

    async fn local_time(&self, query: TimeQuery) -> Reply {
        match self.resolve_local_time(&query.city).await {
            Ok(Some(timestamp)) => Reply::LocalTime {
                city: query.display_city(),
                timestamp,
            },
            Ok(None) => Reply::TimeUnavailable { city: query.city },
            Err(err) => {
                self.metrics.inc_upstream_failure();
                warn!(error = %err, city = %query.city, "time lookup failed");
                Reply::TimeUnavailable { city: query.city }
            }
        }
    }

    async fn resolve_local_time(&self, city: &str) -> Result<Option<String>, AdapterError> {
        let Some(coordinates) = self.adapters.geocoder.geocode(city).await? else {
            return Ok(None);
        };
        let Some(timezone) = self.adapters.timezones.timezone_at(coordinates)? else {
            return Ok(None);
        };

        format_local_time(&timezone, Utc::now()).map(Some)
    }

    async fn convert(&self, query: CurrencyQuery) -> Reply {
        match self.adapters.rates.rate(&query.from, &query.to).await {
            Ok(Some(rate)) if rate != 0.0 => {
                let converted = query.convert(rate);
                Reply::Converted { query, converted }
            }
            Ok(_) => Reply::RateUnavailable {
                from: query.from,
                to: query.to,
            },
            Err(err) => {
                self.metrics.inc_upstream_failure();
                warn!(error = %err, from = %query.from, to = %query.to, "exchange rate lookup failed");
                Reply::RateUnavailable {
                    from: query.from,
                    to: query.to,
                }
            }
        }
    }
}
