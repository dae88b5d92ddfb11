use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::{Mutex, RwLock};
use uuid::Uuid;

use crate::domain::entity::{
    ContentFlag, FlagFilter, FlagStatus, GiftCode, RedeemAttempt, Redemption, Subscription,
    UsagePeriod,
};
use crate::domain::repository::{
    FlagRepository, GiftCodeRepository, SubscriptionRepository, UsageRepository,
};

/// ギフトコードとサブスクリプションは同じロックで守る。
/// `try_redeem` の「未使用なら使用済みにしてティアを付与」を 1 つの臨界区間で行うため。
#[derive(Default)]
struct Ledger {
    gift_codes: HashMap<String, GiftCode>,
    subscriptions: HashMap<String, Subscription>,
}

/// InMemoryStore は単一プロセス構成向けのインメモリストア。
/// 4 つのリポジトリトレイトをまとめて実装する。
#[derive(Default)]
pub struct InMemoryStore {
    ledger: Mutex<Ledger>,
    usage: RwLock<HashMap<(String, String), u64>>,
    flags: RwLock<Vec<ContentFlag>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 利用量を上書きする。
    pub async fn record_usage(&self, user_id: &str, period: &UsagePeriod, count: u64) {
        let mut usage = self.usage.write().await;
        usage.insert((user_id.to_string(), period.to_string()), count);
    }

    /// 利用量を 1 増やし、増加後の値を返す。
    pub async fn increment_usage(&self, user_id: &str, period: &UsagePeriod) -> u64 {
        let mut usage = self.usage.write().await;
        let count = usage
            .entry((user_id.to_string(), period.to_string()))
            .or_insert(0);
        *count += 1;
        *count
    }

    pub async fn seed_flag(&self, flag: ContentFlag) {
        self.flags.write().await.push(flag);
    }
}

#[async_trait]
impl UsageRepository for InMemoryStore {
    async fn get_usage_count(&self, user_id: &str, period: &UsagePeriod) -> anyhow::Result<u64> {
        let usage = self.usage.read().await;
        Ok(usage
            .get(&(user_id.to_string(), period.to_string()))
            .copied()
            .unwrap_or(0))
    }
}

#[async_trait]
impl SubscriptionRepository for InMemoryStore {
    async fn find_by_user(&self, user_id: &str) -> anyhow::Result<Option<Subscription>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.subscriptions.get(user_id).cloned())
    }

    async fn upsert(&self, subscription: &Subscription) -> anyhow::Result<()> {
        let mut ledger = self.ledger.lock().await;
        ledger
            .subscriptions
            .insert(subscription.user_id.clone(), subscription.clone());
        Ok(())
    }
}

#[async_trait]
impl GiftCodeRepository for InMemoryStore {
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<GiftCode>> {
        let ledger = self.ledger.lock().await;
        Ok(ledger.gift_codes.get(&GiftCode::normalize(code)).cloned())
    }

    async fn create(&self, gift: &GiftCode) -> anyhow::Result<bool> {
        let mut ledger = self.ledger.lock().await;
        let code = GiftCode::normalize(&gift.code);
        if ledger.gift_codes.contains_key(&code) {
            return Ok(false);
        }
        let mut gift = gift.clone();
        gift.code.clone_from(&code);
        ledger.gift_codes.insert(code, gift);
        Ok(true)
    }

    async fn try_redeem(
        &self,
        code: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<RedeemAttempt> {
        let mut ledger = self.ledger.lock().await;
        let Ledger {
            gift_codes,
            subscriptions,
        } = &mut *ledger;

        let Some(gift) = gift_codes.get_mut(&GiftCode::normalize(code)) else {
            return Ok(RedeemAttempt::NotFound);
        };
        // 条件付き更新: redeemed = false かつ期限内の行だけを対象にする
        if gift.redeemed {
            return Ok(RedeemAttempt::AlreadyRedeemed);
        }
        if gift.is_expired(now) {
            return Ok(RedeemAttempt::Expired);
        }
        gift.redeemed = true;
        gift.redeemed_by = Some(user_id.to_string());
        gift.redeemed_at = Some(now);

        let subscription = Subscription::with_gift(
            subscriptions.get(user_id),
            user_id,
            gift.tier,
            gift.duration_months,
            now,
        );
        let redemption = Redemption {
            code: gift.code.clone(),
            user_id: user_id.to_string(),
            tier: gift.tier,
            duration_months: gift.duration_months,
            subscription_tier: subscription.tier,
            subscription_expires_at: subscription.expires_at,
            redeemed_at: now,
        };
        subscriptions.insert(user_id.to_string(), subscription);
        Ok(RedeemAttempt::Redeemed(redemption))
    }
}

#[async_trait]
impl FlagRepository for InMemoryStore {
    async fn find_all(&self, filter: &FlagFilter) -> anyhow::Result<Vec<ContentFlag>> {
        let flags = self.flags.read().await;
        let mut matched: Vec<ContentFlag> =
            flags.iter().filter(|f| filter.matches(f)).cloned().collect();
        matched.sort_by_key(|f| f.created_at);
        Ok(matched)
    }

    async fn update_status(
        &self,
        id: &Uuid,
        status: FlagStatus,
        now: DateTime<Utc>,
    ) -> anyhow::Result<Option<ContentFlag>> {
        let mut flags = self.flags.write().await;
        Ok(flags.iter_mut().find(|f| f.id == *id).map(|flag| {
            flag.status = status;
            flag.updated_at = now;
            flag.clone()
        }))
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::domain::entity::TierName;
    use chrono::{Duration, TimeZone};

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 10, 19, 12, 0, 0).unwrap()
    }

    async fn store_with_gift(code: &str) -> InMemoryStore {
        let store = InMemoryStore::new();
        let gift = GiftCode::new(code, TierName::Pro, 3, None, "admin-1", now());
        assert!(store.create(&gift).await.unwrap());
        store
    }

    #[tokio::test]
    async fn test_create_rejects_duplicate_case_insensitive() {
        let store = store_with_gift("ABCD2345EFGH").await;
        let dup = GiftCode::new("abcd2345efgh", TierName::Premium, 1, None, "admin-1", now());
        assert!(!store.create(&dup).await.unwrap());

        let found = store.find_by_code("abcd2345efgh").await.unwrap().unwrap();
        assert_eq!(found.tier, TierName::Pro);
    }

    #[tokio::test]
    async fn test_try_redeem_applies_subscription() {
        let store = store_with_gift("ABCD2345EFGH").await;
        let RedeemAttempt::Redeemed(redemption) = store
            .try_redeem("ABCD2345EFGH", "user-1", now())
            .await
            .unwrap()
        else {
            panic!("expected redemption");
        };

        assert_eq!(redemption.tier, TierName::Pro);
        assert_eq!(redemption.subscription_tier, TierName::Pro);
        let sub = store.find_by_user("user-1").await.unwrap().unwrap();
        assert_eq!(sub.tier, TierName::Pro);
        assert_eq!(sub.expires_at, redemption.subscription_expires_at);

        let gift = store.find_by_code("ABCD2345EFGH").await.unwrap().unwrap();
        assert!(gift.redeemed);
        assert_eq!(gift.redeemed_by.as_deref(), Some("user-1"));
    }

    #[tokio::test]
    async fn test_try_redeem_twice_reports_already_redeemed() {
        let store = store_with_gift("ABCD2345EFGH").await;
        assert!(matches!(
            store.try_redeem("ABCD2345EFGH", "user-1", now()).await.unwrap(),
            RedeemAttempt::Redeemed(_)
        ));
        assert_eq!(
            store.try_redeem("ABCD2345EFGH", "user-2", now()).await.unwrap(),
            RedeemAttempt::AlreadyRedeemed
        );

        assert!(store.find_by_user("user-2").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_try_redeem_concurrent_exactly_once() {
        let store = Arc::new(store_with_gift("ABCD2345EFGH").await);
        let mut handles = Vec::new();
        for i in 0..32 {
            let store = store.clone();
            handles.push(tokio::spawn(async move {
                store
                    .try_redeem("ABCD2345EFGH", &format!("user-{}", i), now())
                    .await
                    .unwrap()
            }));
        }
        let mut winners = 0;
        for handle in handles {
            match handle.await.unwrap() {
                RedeemAttempt::Redeemed(_) => winners += 1,
                other => assert_eq!(other, RedeemAttempt::AlreadyRedeemed),
            }
        }
        assert_eq!(winners, 1);
    }

    #[tokio::test]
    async fn test_try_redeem_reports_missing_and_expired() {
        let store = InMemoryStore::new();
        let gift = GiftCode::new(
            "EXPIRED23456",
            TierName::Pro,
            1,
            Some(now() - Duration::seconds(1)),
            "admin-1",
            now() - Duration::days(10),
        );
        store.create(&gift).await.unwrap();
        assert_eq!(
            store.try_redeem("EXPIRED23456", "user-1", now()).await.unwrap(),
            RedeemAttempt::Expired
        );
        assert_eq!(
            store.try_redeem("NOSUCHCODE23", "user-1", now()).await.unwrap(),
            RedeemAttempt::NotFound
        );
        let gift = store.find_by_code("EXPIRED23456").await.unwrap().unwrap();
        assert!(!gift.redeemed);
        assert!(store.find_by_user("user-1").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_usage_counters() {
        let store = InMemoryStore::new();
        let period = UsagePeriod::monthly(now());
        assert_eq!(store.get_usage_count("user-1", &period).await.unwrap(), 0);

        store.record_usage("user-1", &period, 4).await;
        assert_eq!(store.increment_usage("user-1", &period).await, 5);
        assert_eq!(store.get_usage_count("user-1", &period).await.unwrap(), 5);
        assert_eq!(store.get_usage_count("user-2", &period).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_flags_filter_and_update() {
        let store = InMemoryStore::new();
        let first = ContentFlag::new("dream-1", "user-2", "spam", now());
        let second = ContentFlag::new("dream-2", "user-3", "abuse", now() + Duration::minutes(1));
        let first_id = first.id;
        store.seed_flag(second).await;
        store.seed_flag(first).await;

        let all = store.find_all(&FlagFilter::default()).await.unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].dream_id, "dream-1");

        let updated = store
            .update_status(&first_id, FlagStatus::Reviewed, now() + Duration::hours(1))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(updated.status, FlagStatus::Reviewed);

        let pending = store
            .find_all(&FlagFilter {
                status: Some(FlagStatus::Pending),
            })
            .await
            .unwrap();
        assert_eq!(pending.len(), 1);
        assert_eq!(pending[0].dream_id, "dream-2");

        let missing = store
            .update_status(&Uuid::new_v4(), FlagStatus::Dismissed, now())
            .await
            .unwrap();
        assert!(missing.is_none());
    }
}
