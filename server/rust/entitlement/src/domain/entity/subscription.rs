use chrono::{DateTime, Months, Utc};
use serde::{Deserialize, Serialize};

use super::tier::TierName;

/// ユーザーのサブスクリプション状態。
/// `expires_at` が `None` の場合は期限なし（free、または無期限の有料ティア）。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Subscription {
    pub user_id: String,
    pub tier: TierName,
    pub expires_at: Option<DateTime<Utc>>,
    pub updated_at: DateTime<Utc>,
}

impl Subscription {
    pub fn free(user_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            user_id: user_id.into(),
            tier: TierName::Free,
            expires_at: None,
            updated_at: now,
        }
    }

    /// `now` 時点で有効なティア。期限切れの有料ティアは free として扱う。
    pub fn effective_tier(&self, now: DateTime<Utc>) -> TierName {
        match self.expires_at {
            Some(expires_at) if expires_at <= now => TierName::Free,
            _ => self.tier,
        }
    }

    /// ギフトの `{tier, months}` を適用した新しいサブスクリプションを返す。
    ///
    /// 有効期間中のティアがギフト以上なら、そのティアのまま現在の期限から延長する
    /// (無期限はそのまま維持)。下位ティアまたは期限切れなら `now` を起点にギフトのティアへ置き換える。
    pub fn with_gift(
        current: Option<&Subscription>,
        user_id: &str,
        tier: TierName,
        months: u32,
        now: DateTime<Utc>,
    ) -> Self {
        let (tier, base) = match current {
            Some(sub) if sub.tier.is_paid() && sub.effective_tier(now).rank() >= tier.rank() => {
                match sub.expires_at {
                    None => {
                        return Self {
                            user_id: user_id.to_string(),
                            tier: sub.tier,
                            expires_at: None,
                            updated_at: now,
                        }
                    }
                    Some(expires_at) => (sub.tier, expires_at),
                }
            }
            _ => (tier, now),
        };
        let expires_at = base
            .checked_add_months(Months::new(months))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            user_id: user_id.to_string(),
            tier,
            expires_at: Some(expires_at),
            updated_at: now,
        }
    }
}
