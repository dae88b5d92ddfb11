use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::entity::{GiftCode, RedeemAttempt};

/// GiftCodeRepository はギフトコードの永続化を担当する。
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait GiftCodeRepository: Send + Sync {
    /// 正規化済みコードで検索する。
    async fn find_by_code(&self, code: &str) -> anyhow::Result<Option<GiftCode>>;

    /// コードを登録する。同じコードが既に存在する場合は false を返す。
    async fn create(&self, gift: &GiftCode) -> anyhow::Result<bool>;

    /// `redeemed = false` の場合に限り引き換え済みに更新し、同一トランザクションで
    /// ユーザーのサブスクリプションにティアと期間を適用する。
    ///
    /// 並行する同一コードの呼び出しのうち成功するのは 1 件だけで、
    /// 競合に負けた呼び出しや既に引き換え済みのコードには AlreadyRedeemed を返す。
    /// 判定は更新と同じ時点で行うため、検索後に失効したコードは Expired になる。
    async fn try_redeem(
        &self,
        code: &str,
        user_id: &str,
        now: DateTime<Utc>,
    ) -> anyhow::Result<RedeemAttempt>;
}
