use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use deskmate_core::Coordinates;
use tzf_rs::DefaultFinder;

use crate::{AdapterError, TimezoneLookup};

pub const LOCAL_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Offline coordinate-to-timezone lookup over bundled timezone polygons.
pub struct TzfTimezoneLookup {
    finder: DefaultFinder,
}

impl TzfTimezoneLookup {
    pub fn new() -> Self {
        Self {
            finder: DefaultFinder::new(),
        }
    }
}

impl Default for TzfTimezoneLookup {
    fn default() -> Self {
        Self::new()
    }
}

impl TimezoneLookup for TzfTimezoneLookup {
    fn timezone_at(&self, coordinates: Coordinates) -> Result<Option<String>, AdapterError> {
        let name = self
            .finder
            .get_tz_name(coordinates.longitude, coordinates.latitude);
        if name.trim().is_empty() {
            Ok(None)
        } else {
            Ok(Some(name.to_string()))
        }
    }
}

pub fn format_local_time(timezone: &str, now: DateTime<Utc>) -> Result<String, AdapterError> {
    let tz = timezone
        .parse::<Tz>()
        .map_err(|_| AdapterError::UnknownTimezone(timezone.to_string()))?;
    Ok(now.with_timezone(&tz).format(LOCAL_TIME_FORMAT).to_string())
}
