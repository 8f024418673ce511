//! Signed webhook notifications for progress events.
//!
//! One delivery attempt per event per hook. A non-2xx status or transport
//! error counts as a failure; reaching the configured number of consecutive
//! failures disables the hook until it is re-enabled by hand.

use crate::error::{GoalkitError, Result};
use crate::paths;
use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use uuid::Uuid;

pub const EVENT_HEADER: &str = "X-Goalkit-Event";
pub const DELIVERY_HEADER: &str = "X-Goalkit-Delivery";
pub const SIGNATURE_HEADER: &str = "X-Goalkit-Signature";

// ---------------------------------------------------------------------------
// Events
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    TaskCompleted,
    GoalCompleted,
    DeadlineApproaching,
    HighRisk,
}

impl EventKind {
    pub fn all() -> &'static [EventKind] {
        &[
            EventKind::TaskCompleted,
            EventKind::GoalCompleted,
            EventKind::DeadlineApproaching,
            EventKind::HighRisk,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            EventKind::TaskCompleted => "task_completed",
            EventKind::GoalCompleted => "goal_completed",
            EventKind::DeadlineApproaching => "deadline_approaching",
            EventKind::HighRisk => "high_risk",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for EventKind {
    type Err = GoalkitError;

    fn from_str(s: &str) -> Result<Self> {
        EventKind::all()
            .iter()
            .copied()
            .find(|k| k.as_str() == s.trim().replace('-', "_"))
            .ok_or_else(|| GoalkitError::UnknownEvent(s.to_string()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Event {
    pub kind: EventKind,
    pub data: serde_json::Value,
}

impl Event {
    pub fn new(kind: EventKind, data: serde_json::Value) -> Self {
        Self { kind, data }
    }
}

// ---------------------------------------------------------------------------
// Registry
// ---------------------------------------------------------------------------

fn default_true() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Webhook {
    pub id: String,
    pub url: String,
    pub secret: String,
    /// Empty means every event.
    #[serde(default)]
    pub events: Vec<EventKind>,
    #[serde(default = "default_true")]
    pub active: bool,
    #[serde(default)]
    pub consecutive_failures: u32,
    pub created_at: DateTime<Utc>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_delivery_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_status: Option<u16>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub disabled_at: Option<DateTime<Utc>>,
}

impl Webhook {
    pub fn subscribes(&self, kind: EventKind) -> bool {
        self.events.is_empty() || self.events.contains(&kind)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Registry {
    #[serde(default)]
    pub webhooks: Vec<Webhook>,
}

impl Registry {
    pub fn load(root: &Path) -> Result<Self> {
        let path = paths::webhooks_path(root);
        if !path.exists() {
            return Ok(Self::default());
        }
        let data = std::fs::read_to_string(&path)?;
        Ok(serde_yaml::from_str(&data)?)
    }

    pub fn save(&self, root: &Path) -> Result<()> {
        let data = serde_yaml::to_string(self)?;
        crate::io::atomic_write(&paths::webhooks_path(root), data.as_bytes())
    }

    /// Register a hook. A random secret is generated when none is given.
    pub fn add(&mut self, url: &str, secret: Option<String>, events: Vec<EventKind>) -> Result<&Webhook> {
        if !(url.starts_with("http://") || url.starts_with("https://")) {
            return Err(GoalkitError::InvalidWebhookUrl(url.to_string()));
        }
        let id = Uuid::new_v4().simple().to_string()[..8].to_string();
        self.webhooks.push(Webhook {
            id,
            url: url.to_string(),
            secret: secret.unwrap_or_else(|| Uuid::new_v4().simple().to_string()),
            events,
            active: true,
            consecutive_failures: 0,
            created_at: Utc::now(),
            last_delivery_at: None,
            last_status: None,
            disabled_at: None,
        });
        Ok(&self.webhooks[self.webhooks.len() - 1])
    }

    pub fn get_mut(&mut self, id: &str) -> Result<&mut Webhook> {
        self.webhooks
            .iter_mut()
            .find(|w| w.id == id)
            .ok_or_else(|| GoalkitError::WebhookNotFound(id.to_string()))
    }

    pub fn remove(&mut self, id: &str) -> Result<Webhook> {
        let idx = self
            .webhooks
            .iter()
            .position(|w| w.id == id)
            .ok_or_else(|| GoalkitError::WebhookNotFound(id.to_string()))?;
        Ok(self.webhooks.remove(idx))
    }

    /// Re-activate a disabled hook and clear its failure count.
    pub fn enable(&mut self, id: &str) -> Result<()> {
        let hook = self.get_mut(id)?;
        hook.active = true;
        hook.consecutive_failures = 0;
        hook.disabled_at = None;
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Signing
// ---------------------------------------------------------------------------

type HmacSha256 = Hmac<Sha256>;

/// `sha256=<hex HMAC-SHA256(secret, body)>`
pub fn sign(secret: &str, body: &[u8]) -> Result<String> {
    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| GoalkitError::Signing(e.to_string()))?;
    mac.update(body);
    Ok(format!("sha256={}", hex::encode(mac.finalize().into_bytes())))
}

/// Constant-time check of a signature header, for receivers.
pub fn verify_signature(secret: &str, body: &[u8], header: &str) -> bool {
    let Some(digest) = header.strip_prefix("sha256=") else {
        return false;
    };
    let Ok(expected) = hex::decode(digest) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

// ---------------------------------------------------------------------------
// Transport
// ---------------------------------------------------------------------------

pub trait Transport {
    /// POST `body` and return the HTTP status code.
    fn post(&self, url: &str, headers: &[(&str, String)], body: &[u8]) -> Result<u16>;
}

pub struct HttpTransport {
    client: reqwest::blocking::Client,
}

impl HttpTransport {
    pub fn new(timeout: Duration) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .user_agent(concat!("goalkit/", env!("CARGO_PKG_VERSION")))
            .build()?;
        Ok(Self { client })
    }
}

impl Transport for HttpTransport {
    fn post(&self, url: &str, headers: &[(&str, String)], body: &[u8]) -> Result<u16> {
        let mut req = self
            .client
            .post(url)
            .header(reqwest::header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            req = req.header(*name, value.as_str());
        }
        let resp = req.body(body.to_vec()).send()?;
        Ok(resp.status().as_u16())
    }
}

// ---------------------------------------------------------------------------
// Dispatcher
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Delivery {
    pub webhook_id: String,
    pub event: EventKind,
    pub delivery_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// The hook was disabled by this failure.
    pub disabled: bool,
}

pub struct Dispatcher<'a> {
    transport: &'a dyn Transport,
    project: String,
    failure_threshold: u32,
}

impl<'a> Dispatcher<'a> {
    pub fn new(transport: &'a dyn Transport, project: impl Into<String>, failure_threshold: u32) -> Self {
        Self {
            transport,
            project: project.into(),
            failure_threshold: failure_threshold.max(1),
        }
    }

    pub fn payload(&self, event: &Event, delivery_id: &str, timestamp: DateTime<Utc>) -> serde_json::Value {
        serde_json::json!({
            "event": event.kind,
            "delivery_id": delivery_id,
            "timestamp": timestamp.to_rfc3339(),
            "project": self.project,
            "data": event.data,
        })
    }

    /// Deliver `event` once to `hook`, updating its failure bookkeeping.
    pub fn deliver(&self, hook: &mut Webhook, event: &Event) -> Delivery {
        let delivery_id = Uuid::new_v4().to_string();
        let now = Utc::now();
        let mut delivery = Delivery {
            webhook_id: hook.id.clone(),
            event: event.kind,
            delivery_id: delivery_id.clone(),
            status: None,
            success: false,
            error: None,
            disabled: false,
        };

        let outcome = serde_json::to_vec(&self.payload(event, &delivery_id, now))
            .map_err(GoalkitError::from)
            .and_then(|body| {
                let signature = sign(&hook.secret, &body)?;
                let headers = [
                    (EVENT_HEADER, event.kind.as_str().to_string()),
                    (DELIVERY_HEADER, delivery_id.clone()),
                    (SIGNATURE_HEADER, signature),
                ];
                self.transport.post(&hook.url, &headers, &body)
            });

        hook.last_delivery_at = Some(now);
        match outcome {
            Ok(status) => {
                delivery.status = Some(status);
                hook.last_status = Some(status);
                delivery.success = (200..300).contains(&status);
                if !delivery.success {
                    delivery.error = Some(format!("HTTP {status}"));
                }
            }
            Err(e) => delivery.error = Some(e.to_string()),
        }

        if delivery.success {
            hook.consecutive_failures = 0;
            tracing::info!(webhook = %hook.id, event = %event.kind, "webhook delivered");
        } else {
            hook.consecutive_failures += 1;
            tracing::warn!(
                webhook = %hook.id,
                event = %event.kind,
                failures = hook.consecutive_failures,
                error = delivery.error.as_deref().unwrap_or_default(),
                "webhook delivery failed"
            );
            if hook.consecutive_failures >= self.failure_threshold {
                hook.active = false;
                hook.disabled_at = Some(now);
                delivery.disabled = true;
                tracing::warn!(webhook = %hook.id, "webhook disabled after repeated failures");
            }
        }
        delivery
    }

    /// Deliver `event` to every active hook subscribed to it.
    pub fn dispatch(&self, registry: &mut Registry, event: &Event) -> Vec<Delivery> {
        registry
            .webhooks
            .iter_mut()
            .filter(|w| w.active && w.subscribes(event.kind))
            .map(|w| self.deliver(w, event))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
