use crate::domain::entity::{Identity, Role};

/// 認可チェックの結果。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthorizationOutcome {
    Allowed,
    Unauthenticated,
    Forbidden,
}

/// AuthorizationService は呼び出し元のロールから管理操作の可否を判定する。
pub struct AuthorizationService;

impl AuthorizationService {
    /// 認証を必ずロールより先に確認する。未認証の呼び出し元には
    /// 対象リソースや必要ロールに関する情報を一切返さない。
    pub fn require_role(identity: Option<&Identity>, required: Role) -> AuthorizationOutcome {
        match identity {
            None => AuthorizationOutcome::Unauthenticated,
            Some(identity) if identity.role.satisfies(required) => AuthorizationOutcome::Allowed,
            Some(_) => AuthorizationOutcome::Forbidden,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_no_identity_is_unauthenticated() {
        assert_eq!(
            AuthorizationService::require_role(None, Role::Admin),
            AuthorizationOutcome::Unauthenticated
        );
        assert_eq!(
            AuthorizationService::require_role(None, Role::User),
            AuthorizationOutcome::Unauthenticated
        );
    }

    #[test]
    fn test_user_requesting_admin_is_forbidden() {
        let user = Identity::new("user-1", Role::User);
        assert_eq!(
            AuthorizationService::require_role(Some(&user), Role::Admin),
            AuthorizationOutcome::Forbidden
        );
    }

    #[test]
    fn test_admin_is_allowed() {
        let admin = Identity::new("admin-1", Role::Admin);
        assert_eq!(
            AuthorizationService::require_role(Some(&admin), Role::Admin),
            AuthorizationOutcome::Allowed
        );
        assert_eq!(
            AuthorizationService::require_role(Some(&admin), Role::User),
            AuthorizationOutcome::Allowed
        );
    }

    #[test]
    fn test_user_requesting_user_is_allowed() {
        let user = Identity::new("user-1", Role::User);
        assert_eq!(
            AuthorizationService::require_role(Some(&user), Role::User),
            AuthorizationOutcome::Allowed
        );
    }
}
