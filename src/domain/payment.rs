use bytes::Bytes;
use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Route {
    Default,
    Fallback,
}

impl Route {
    pub fn as_str(&self) -> &'static str {
        match self {
            Route::Default => "default",
            Route::Fallback => "fallback",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-submitted payment body, kept as the raw bytes that arrived on the
/// wire. The pipeline never rejects a payload based on its contents;
/// `correlationId` and `amount` are read out lazily where needed.
#[derive(Debug, Clone)]
pub struct PaymentPayload {
    body: Bytes,
}

impl PaymentPayload {
    pub fn new(body: Bytes) -> Self {
        Self { body }
    }

    pub fn from_json(value: &Value) -> Self {
        Self {
            body: Bytes::from(value.to_string()),
        }
    }

    pub fn correlation_id(&self) -> Option<String> {
        let fields = self.fields()?;
        Some(fields.get("correlationId")?.as_str()?.to_string())
    }

    pub fn amount(&self) -> Option<f64> {
        self.fields()?.get("amount")?.as_f64()
    }

    /// Body forwarded to the processor: the submitted fields plus a
    /// `requestedAt` stamp taken at dispatch time. Returns `None` when the
    /// bytes are not a JSON object, in which case there is nothing to send.
    pub fn dispatch_body(&self, requested_at: DateTime<Utc>) -> Option<Value> {
        let mut fields = self.fields()?;
        fields.insert(
            "requestedAt".to_string(),
            Value::String(requested_at.to_rfc3339_opts(SecondsFormat::Micros, true)),
        );
        Some(Value::Object(fields))
    }

    fn fields(&self) -> Option<Map<String, Value>> {
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => Some(map),
            _ => None,
        }
    }
}
