use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use tracing::{info, warn};

use crate::domain::entity::{GiftCode, TierName};
use crate::domain::repository::GiftCodeRepository;

/// 読み間違えやすい文字（0/O, 1/I）を除いた英大文字と数字。
const CODE_ALPHABET: &[u8] = b"ABCDEFGHJKLMNPQRSTUVWXYZ23456789";
const CODE_LEN: usize = 12;
const MAX_ALLOCATION_ATTEMPTS: usize = 5;
const MAX_DURATION_MONTHS: u32 = 24;

#[derive(Debug, Clone)]
pub struct CreateGiftCodeInput {
    pub tier: TierName,
    pub duration_months: u32,
    pub expires_at: Option<DateTime<Utc>>,
}

#[derive(Debug, thiserror::Error)]
pub enum CreateGiftCodeError {
    #[error("validation error: {0}")]
    Validation(String),

    #[error("internal error: {0}")]
    Internal(String),
}

/// CreateGiftCodeUseCase は管理者向けにギフトコードを発行する。
pub struct CreateGiftCodeUseCase {
    repo: Arc<dyn GiftCodeRepository>,
}

impl CreateGiftCodeUseCase {
    pub fn new(repo: Arc<dyn GiftCodeRepository>) -> Self {
        Self { repo }
    }

    pub async fn execute(
        &self,
        input: &CreateGiftCodeInput,
        created_by: &str,
        now: DateTime<Utc>,
    ) -> Result<GiftCode, CreateGiftCodeError> {
        if !input.tier.is_paid() {
            return Err(CreateGiftCodeError::Validation(
                "gift codes must grant a paid tier".to_string(),
            ));
        }
        if input.duration_months == 0 || input.duration_months > MAX_DURATION_MONTHS {
            return Err(CreateGiftCodeError::Validation(format!(
                "duration_months must be between 1 and {}",
                MAX_DURATION_MONTHS
            )));
        }
        if input.expires_at.is_some_and(|expires_at| expires_at <= now) {
            return Err(CreateGiftCodeError::Validation(
                "expires_at must be in the future".to_string(),
            ));
        }

        for attempt in 1..=MAX_ALLOCATION_ATTEMPTS {
            let gift = GiftCode::new(
                &generate_code(),
                input.tier,
                input.duration_months,
                input.expires_at,
                created_by,
                now,
            );
            let created = self
                .repo
                .create(&gift)
                .await
                .map_err(|e| CreateGiftCodeError::Internal(e.to_string()))?;
            if created {
                info!(
                    code = %GiftCode::masked(&gift.code),
                    tier = %gift.tier,
                    duration_months = gift.duration_months,
                    created_by,
                    "gift code created"
                );
                return Ok(gift);
            }
            warn!(attempt, "gift code collision, regenerating");
        }

        Err(CreateGiftCodeError::Internal(
            "could not allocate a unique gift code".to_string(),
        ))
    }
}

fn generate_code() -> String {
    let mut rng = rand::thread_rng();
    (0..CODE_LEN)
        .map(|_| char::from(CODE_ALPHABET[rng.gen_range(0..CODE_ALPHABET.len())]))
        .collect()
}
