use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 通報されたドリームの審査状態。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FlagStatus {
    Pending,
    Reviewed,
    Dismissed,
}

impl FlagStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            FlagStatus::Pending => "pending",
            FlagStatus::Reviewed => "reviewed",
            FlagStatus::Dismissed => "dismissed",
        }
    }
}

impl FromStr for FlagStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(FlagStatus::Pending),
            "reviewed" => Ok(FlagStatus::Reviewed),
            "dismissed" => Ok(FlagStatus::Dismissed),
            _ => Err(format!("unknown flag status: {}", s)),
        }
    }
}

/// ドリームに対するモデレーション通報。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContentFlag {
    pub id: Uuid,
    pub dream_id: String,
    pub reporter_id: String,
    pub reason: String,
    pub status: FlagStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl ContentFlag {
    pub fn new(
        dream_id: impl Into<String>,
        reporter_id: impl Into<String>,
        reason: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            id: Uuid::new_v4(),
            dream_id: dream_id.into(),
            reporter_id: reporter_id.into(),
            reason: reason.into(),
            status: FlagStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FlagFilter {
    pub status: Option<FlagStatus>,
}

impl FlagFilter {
    pub fn matches(&self, flag: &ContentFlag) -> bool {
        self.status.map_or(true, |status| flag.status == status)
    }
}
