use chrono::{DateTime, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretBox, SecretString};
use sha2::Sha256;

type HmacSha256 = Hmac<Sha256>;

const VERSION: &str = "v1";

/// 開発者セッション Cookie の署名と検証を行う。
///
/// 値の形式は `v1.<失効 UNIX 秒>.<HMAC-SHA256 16 進>`。サーバー側にセッション表は持たず、
/// 有効な署名付き Cookie を持っていること自体が認可となる。
pub struct SessionSigner {
    key: SecretBox<Vec<u8>>,
}

impl SessionSigner {
    pub fn new(key: &SecretString) -> Self {
        Self {
            key: SecretBox::new(Box::new(key.expose_secret().as_bytes().to_vec())),
        }
    }

    fn mac(&self, expires_unix: i64) -> HmacSha256 {
        let mut mac = HmacSha256::new_from_slice(self.key.expose_secret())
            .expect("HMAC can take key of any size");
        mac.update(format!("dev_session:{}:{}", VERSION, expires_unix).as_bytes());
        mac
    }

    pub fn sign(&self, expires_at: DateTime<Utc>) -> String {
        let expires_unix = expires_at.timestamp();
        let signature = self.mac(expires_unix).finalize().into_bytes();
        format!("{}.{}.{}", VERSION, expires_unix, hex::encode(signature))
    }

    /// 署名が正しく、かつ `now` 時点で失効していなければ true。
    pub fn verify(&self, value: &str, now: DateTime<Utc>) -> bool {
        let mut parts = value.splitn(3, '.');
        let (Some(version), Some(expires), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return false;
        };
        if version != VERSION {
            return false;
        }
        let Ok(expires_unix) = expires.parse::<i64>() else {
            return false;
        };
        if now.timestamp() >= expires_unix {
            return false;
        }
        let Ok(signature) = hex::decode(signature) else {
            return false;
        };
        // verify_slice は定数時間で比較する
        self.mac(expires_unix).verify_slice(&signature).is_ok()
    }
}
