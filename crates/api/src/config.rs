use std::env;
use std::path::PathBuf;
use std::time::Duration;

use deskmate_adapters::AdapterConfig;
use deskmate_core::DEFAULT_FAQ_THRESHOLD;
use deskmate_ml::DEFAULT_QA_MODEL;
use deskmate_storage::DEFAULT_UPLOAD_DIR;

pub const DEFAULT_BIND: &str = "0.0.0.0:5000";
pub const DEFAULT_SESSION_TTL_SECONDS: u64 = 60 * 60 * 24;
pub const DEFAULT_MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

#[derive(Debug, Clone)]
pub struct Settings {
    pub bind: String,
    pub upload_dir: PathBuf,
    pub faq_path: Option<PathBuf>,
    pub faq_threshold: f64,
    pub qa_model: String,
    pub adapters: AdapterConfig,
    pub session_ttl: Duration,
    pub max_upload_bytes: usize,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            bind: DEFAULT_BIND.to_string(),
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            faq_path: None,
            faq_threshold: DEFAULT_FAQ_THRESHOLD,
            qa_model: DEFAULT_QA_MODEL.to_string(),
            adapters: AdapterConfig::default(),
            session_ttl: Duration::from_secs(DEFAULT_SESSION_TTL_SECONDS),
            max_upload_bytes: DEFAULT_MAX_UPLOAD_BYTES,
        }
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mut bind = non_empty_var("DESKMATE_BIND").unwrap_or(defaults.bind);
        if let Some(port) = non_empty_var("PORT").and_then(|value| value.parse::<u16>().ok()) {
            bind = with_port(&bind, port);
        }

        Self {
            bind,
            upload_dir: non_empty_var("DESKMATE_UPLOAD_DIR")
                .map(PathBuf::from)
                .unwrap_or(defaults.upload_dir),
            faq_path: non_empty_var("DESKMATE_FAQ_PATH").map(PathBuf::from),
            faq_threshold: non_empty_var("DESKMATE_FAQ_THRESHOLD")
                .and_then(|value| value.parse::<f64>().ok())
                .filter(|value| (0.0..=100.0).contains(value))
                .unwrap_or(defaults.faq_threshold),
            qa_model: non_empty_var("DESKMATE_QA_MODEL").unwrap_or(defaults.qa_model),
            adapters: AdapterConfig::from_env(),
            session_ttl: Duration::from_secs(
                non_empty_var("DESKMATE_SESSION_TTL_SECONDS")
                    .and_then(|value| value.parse::<u64>().ok())
                    .unwrap_or(DEFAULT_SESSION_TTL_SECONDS),
            ),
            max_upload_bytes: non_empty_var("DESKMATE_MAX_UPLOAD_BYTES")
                .and_then(|value| value.parse::<usize>().ok())
                .unwrap_or(defaults.max_upload_bytes),
        }
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key)
        .ok()
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}

fn with_port(bind: &str, port: u16) -> String {
    match bind.rsplit_once(':') {
        Some((host, _)) => format!("{host}:{port}"),
        None => format!("{bind}:{port}"),
    }
}
