//! Report encoding
//!
//! Wraps any analysis result in a JSON envelope that records who produced it
//! and when, so results stored by a client can be traced back to an engine
//! version.

use crate::types::DateRange;
use crate::{ENGINE_VERSION, PRODUCER_NAME};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Current report envelope version
pub const REPORT_VERSION: &str = "1.0.0";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportProducer {
    pub name: String,
    pub version: String,
    pub instance_id: String,
}

/// Envelope around one analysis payload
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InsightsReport<T> {
    pub report_version: String,
    pub producer: ReportProducer,
    /// RFC 3339 timestamp
    pub computed_at_utc: String,
    pub date_range: DateRange,
    pub payload: T,
}

/// Report encoder for producing JSON envelopes
pub struct ReportEncoder {
    instance_id: String,
}

impl Default for ReportEncoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ReportEncoder {
    /// Create a new encoder with a unique instance ID
    pub fn new() -> Self {
        Self {
            instance_id: Uuid::new_v4().to_string(),
        }
    }

    /// Create an encoder with a specific instance ID
    pub fn with_instance_id(instance_id: String) -> Self {
        Self { instance_id }
    }

    pub fn instance_id(&self) -> &str {
        &self.instance_id
    }

    /// Wrap `payload` in a report stamped with the current time
    pub fn wrap<T>(&self, payload: T, date_range: DateRange) -> InsightsReport<T> {
        InsightsReport {
            report_version: REPORT_VERSION.to_string(),
            producer: ReportProducer {
                name: PRODUCER_NAME.to_string(),
                version: ENGINE_VERSION.to_string(),
                instance_id: self.instance_id.clone(),
            },
            computed_at_utc: Utc::now().to_rfc3339(),
            date_range,
            payload,
        }
    }

    /// Encode to a JSON string
    pub fn encode_to_json<T: Serialize>(
        &self,
        payload: T,
        date_range: DateRange,
        pretty: bool,
    ) -> Result<String, serde_json::Error> {
        let report = self.wrap(payload, date_range);
        if pretty {
            serde_json::to_string_pretty(&report)
        } else {
            serde_json::to_string(&report)
        }
    }
}
