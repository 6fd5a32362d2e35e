//! Parsing upstream property payloads into a [`PropertyRecord`].
//!
//! Every extraction is independent. A missing or malformed field is logged and
//! the record keeps its previous value for that field, so a partial payload
//! still caches whatever did parse.

use crate::domain::model::{PropertyRecord, SewageType};
use chrono::NaiveDate;
use serde_json::{Map, Value};

/// Returns the envelope stored under `key` (an API client's path without slashes),
/// or the payload itself when it is not keyed that way.
pub fn envelope<'a>(payload: &'a Value, key: &str) -> &'a Value {
    payload.get(key).unwrap_or(payload)
}

impl PropertyRecord {
    /// Updates this record in place from an envelope shaped like `{"result": {...}}`.
    ///
    /// Never fails.
    pub fn parse(&mut self, payload: &Value) -> &mut Self {
        let Some(result) = payload.get("result").and_then(Value::as_object) else {
            tracing::warn!(
                "⚠️ {}: payload has no `result` object, nothing to parse",
                self.identifier
            );
            return self;
        };

        self.update_sewage_type(result);
        self.update_assessment_date(result);

        // 整個覆蓋，不做合併
        if !result.is_empty() {
            self.other_data = Value::Object(result.clone());
        }

        self
    }

    fn update_sewage_type(&mut self, result: &Map<String, Value>) {
        let Some(sewer) = result.get("property").and_then(|p| p.get("sewer")) else {
            tracing::warn!("⚠️ {}: missing result.property.sewer", self.identifier);
            return;
        };

        match sewer.as_str().and_then(SewageType::from_label) {
            Some(sewage_type) => {
                tracing::debug!("{}: sewage type {}", self.identifier, sewage_type);
                self.sewage_type = sewage_type;
            }
            None => tracing::warn!(
                "⚠️ {}: unrecognized sewer value {}, keeping {}",
                self.identifier,
                sewer,
                self.sewage_type
            ),
        }
    }

    fn update_assessment_date(&mut self, result: &Map<String, Value>) {
        let Some(year) = result
            .get("assessment")
            .and_then(|a| a.get("assessment_year"))
        else {
            tracing::warn!(
                "⚠️ {}: missing result.assessment.assessment_year",
                self.identifier
            );
            return;
        };

        // API 只提供年份，日期固定為 1 月 1 日
        match assessment_year(year).and_then(|y| NaiveDate::from_ymd_opt(y, 1, 1)) {
            Some(date) => self.assessment_date = Some(date),
            None => tracing::warn!(
                "⚠️ {}: unusable assessment_year {}",
                self.identifier,
                year
            ),
        }
    }
}

/// Only integer years are accepted. Strings and fractional numbers are unusable.
fn assessment_year(value: &Value) -> Option<i32> {
    value.as_i64().and_then(|year| i32::try_from(year).ok())
}
