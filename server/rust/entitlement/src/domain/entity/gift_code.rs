use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::tier::TierName;

/// ギフトコード。`redeemed` は false → true に最大 1 回だけ遷移し、true は終端状態。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GiftCode {
    pub code: String,
    pub tier: TierName,
    pub duration_months: u32,
    pub redeemed: bool,
    pub redeemed_by: Option<String>,
    pub redeemed_at: Option<DateTime<Utc>>,
    pub expires_at: Option<DateTime<Utc>>,
    pub created_by: String,
    pub created_at: DateTime<Utc>,
}

impl GiftCode {
    pub fn new(
        code: &str,
        tier: TierName,
        duration_months: u32,
        expires_at: Option<DateTime<Utc>>,
        created_by: impl Into<String>,
        now: DateTime<Utc>,
    ) -> Self {
        Self {
            code: Self::normalize(code),
            tier,
            duration_months,
            redeemed: false,
            redeemed_by: None,
            redeemed_at: None,
            expires_at,
            created_by: created_by.into(),
            created_at: now,
        }
    }

    /// コードは大文字小文字を区別しない。保存・検索の前に必ず正規化する。
    pub fn normalize(code: &str) -> String {
        code.trim().to_ascii_uppercase()
    }

    pub fn is_expired(&self, now: DateTime<Utc>) -> bool {
        self.expires_at.is_some_and(|expires_at| now > expires_at)
    }

    /// ログ出力用に末尾 4 文字以外を伏せたコード。
    pub fn masked(code: &str) -> String {
        let chars: Vec<char> = code.chars().collect();
        if chars.len() <= 4 {
            return "*".repeat(chars.len());
        }
        let visible: String = chars[chars.len() - 4..].iter().collect();
        format!("{}{}", "*".repeat(chars.len() - 4), visible)
    }
}

/// 引き換え成功時に適用された内容。
/// `tier` はギフトのティア、`subscription_tier` は適用後のサブスクリプションのティア。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Redemption {
    pub code: String,
    pub user_id: String,
    pub tier: TierName,
    pub duration_months: u32,
    pub subscription_tier: TierName,
    pub subscription_expires_at: Option<DateTime<Utc>>,
    pub redeemed_at: DateTime<Utc>,
}

/// 条件付き引き換えの結果。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RedeemAttempt {
    Redeemed(Redemption),
    NotFound,
    AlreadyRedeemed,
    Expired,
}
