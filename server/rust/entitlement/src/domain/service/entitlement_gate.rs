use crate::domain::entity::{LimitField, Tier, TierName};

/// EntitlementGate はクォータ対象アクションの実行可否を判定する純粋関数群。
/// 利用量の読み書きは行わず、呼び出し側が渡したカウンターと上限の組で判定する。
pub struct EntitlementGate;

impl EntitlementGate {
    /// 判定順序:
    /// 1. admin は常に許可（ティアに依存しない）
    /// 2. 上限が無制限なら許可
    /// 3. `usage_count < limit` なら許可（上限に達したアクションの次から拒否）
    pub fn can_perform(tier: TierName, field: LimitField, usage_count: u64, is_admin: bool) -> bool {
        if is_admin {
            return true;
        }
        if Tier::is_unlimited(tier, field) {
            return true;
        }
        match u64::try_from(Tier::limit_for(tier, field)) {
            Ok(limit) => usage_count < limit,
            Err(_) => false,
        }
    }

    pub fn can_create_dream(tier: TierName, usage_count: u64, is_admin: bool) -> bool {
        Self::can_perform(tier, LimitField::DreamsPerMonth, usage_count, is_admin)
    }
}
