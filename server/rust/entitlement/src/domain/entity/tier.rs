//! サブスクリプションティアの静的カタログ。
//!
//! ティアはコンパイル時に確定した {free, pro, premium} の固定集合で、実行時に変更されない。
//! 上限値 `-1` は「無制限」を表す番兵値で、それ以外の負値は意味を持たない。

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// 無制限を表す上限値。
pub const UNLIMITED: i64 = -1;

/// 未知のティア名。
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid tier: {0}")]
pub struct InvalidTier(pub String);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TierName {
    Free,
    Pro,
    Premium,
}

impl TierName {
    pub fn as_str(&self) -> &'static str {
        match self {
            TierName::Free => "free",
            TierName::Pro => "pro",
            TierName::Premium => "premium",
        }
    }

    /// ティアの序列。上位ティアほど大きい。
    pub fn rank(&self) -> u8 {
        match self {
            TierName::Free => 0,
            TierName::Pro => 1,
            TierName::Premium => 2,
        }
    }

    /// 有料ティアかどうか。ギフトコードは有料ティアのみ発行できる。
    pub fn is_paid(&self) -> bool {
        !matches!(self, TierName::Free)
    }
}

impl fmt::Display for TierName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TierName {
    type Err = InvalidTier;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "free" => Ok(TierName::Free),
            "pro" => Ok(TierName::Pro),
            "premium" => Ok(TierName::Premium),
            _ => Err(InvalidTier(s.to_string())),
        }
    }
}

/// クォータ対象の上限項目。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LimitField {
    DreamsPerMonth,
    PanelsPerDream,
    MaxStorageMb,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TierLimits {
    pub dreams_per_month: i64,
    pub panels_per_dream: i64,
    pub max_storage_mb: i64,
}

impl TierLimits {
    pub fn get(&self, field: LimitField) -> i64 {
        match field {
            LimitField::DreamsPerMonth => self.dreams_per_month,
            LimitField::PanelsPerDream => self.panels_per_dream,
            LimitField::MaxStorageMb => self.max_storage_mb,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Tier {
    pub name: TierName,
    pub monthly_price_cents: u32,
    pub limits: TierLimits,
    /// 表示順はカタログ順（アルファベット順ではない）。
    pub features: &'static [&'static str],
}

static CATALOG: [Tier; 3] = [
    Tier {
        name: TierName::Free,
        monthly_price_cents: 0,
        limits: TierLimits {
            dreams_per_month: 5,
            panels_per_dream: 4,
            max_storage_mb: 100,
        },
        features: &[
            "5 dreams per month",
            "4 panels per dream",
            "Standard art styles",
        ],
    },
    Tier {
        name: TierName::Pro,
        monthly_price_cents: 999,
        limits: TierLimits {
            dreams_per_month: 50,
            panels_per_dream: 6,
            max_storage_mb: 2048,
        },
        features: &[
            "50 dreams per month",
            "6 panels per dream",
            "All art styles",
            "HD downloads",
        ],
    },
    Tier {
        name: TierName::Premium,
        monthly_price_cents: 1999,
        limits: TierLimits {
            dreams_per_month: UNLIMITED,
            panels_per_dream: 9,
            max_storage_mb: 10240,
        },
        features: &[
            "Unlimited dreams",
            "9 panels per dream",
            "All art styles",
            "HD downloads",
            "Priority generation",
        ],
    },
];

impl Tier {
    /// カタログ全体を表示順で返す。
    pub fn catalog() -> &'static [Tier] {
        &CATALOG
    }

    pub fn get(name: TierName) -> &'static Tier {
        match name {
            TierName::Free => &CATALOG[0],
            TierName::Pro => &CATALOG[1],
            TierName::Premium => &CATALOG[2],
        }
    }

    /// ティア名文字列からカタログを引く。未知の名前は [`InvalidTier`]。
    pub fn lookup(name: &str) -> Result<&'static Tier, InvalidTier> {
        name.parse::<TierName>().map(Tier::get)
    }

    pub fn limit_for(name: TierName, field: LimitField) -> i64 {
        Tier::get(name).limits.get(field)
    }

    pub fn is_unlimited(name: TierName, field: LimitField) -> bool {
        Tier::limit_for(name, field) == UNLIMITED
    }

    pub fn features(name: TierName) -> &'static [&'static str] {
        Tier::get(name).features
    }
}
