use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::utils::CCStr;

/// Next id handed out by [next_unique_id]. Starts at 1, never reset.
static NEXT_ID: AtomicU64 = AtomicU64::new(1);

/// Allocates a process-wide unique id
///
/// Ids are strictly increasing in allocation order and never reused for the
/// lifetime of the process, regardless of which thread allocates them.
pub fn next_unique_id() -> u64 {
    NEXT_ID.fetch_add(1, Ordering::Relaxed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AlertType {
    Success,
    Info,
    Error,
}
impl core::fmt::Display for AlertType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::Success => "success",
            Self::Info => "info",
            Self::Error => "error",
        })
    }
}

/// A notification record meant to be displayed by the host
///
/// Every constructor allocates a fresh id with [next_unique_id], so two alerts
/// never compare equal unless one is a clone of the other.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alert {
    id: u64,
    text: CCStr,
    #[serde(rename = "type")]
    alert_type: AlertType,
}
impl Alert {
    pub fn new(alert_type: AlertType, text: impl Into<CCStr>) -> Self {
        Self {
            id: next_unique_id(),
            text: text.into(),
            alert_type,
        }
    }
    pub fn success(text: impl Into<CCStr>) -> Self {
        Self::new(AlertType::Success, text)
    }
    pub fn info(text: impl Into<CCStr>) -> Self {
        Self::new(AlertType::Info, text)
    }
    pub fn error(text: impl Into<CCStr>) -> Self {
        Self::new(AlertType::Error, text)
    }

    pub fn id(&self) -> u64 {
        self.id
    }
    pub fn text(&self) -> &CCStr {
        &self.text
    }
    pub fn alert_type(&self) -> AlertType {
        self.alert_type
    }
}
