use crate::{PolicyCheck, PolicyDecisionPoint, PolicyError, Role, SessionUser, UserSync};

/// Tenant used for checks and role assignment unless configured otherwise.
pub const DEFAULT_TENANT: &str = "default";

/// Ask the policy service whether `user` may perform `check`.
///
/// Fail-closed: users without a policy key and any PDP error yield `false`.
pub async fn authorize(pdp: &dyn PolicyDecisionPoint, user: &SessionUser, check: &PolicyCheck) -> bool {
    if user.policy_key().is_none() {
        tracing::error!("user id or email not found in session");
        return false;
    }

    match pdp.check(user, check).await {
        Ok(permitted) => {
            tracing::debug!(
                user = user.policy_key().unwrap_or_default(),
                action = %check.action,
                resource = %check.resource,
                permitted,
                "policy decision"
            );
            permitted
        }
        Err(e) => {
            tracing::warn!(
                action = %check.action,
                resource = %check.resource,
                "permission check failed: {e}"
            );
            false
        }
    }
}

/// Sync `user` into the policy service and give them the `member` role.
pub async fn enroll(
    pdp: &dyn PolicyDecisionPoint,
    user: &SessionUser,
    sync: &UserSync,
    tenant: &str,
) -> Result<(), PolicyError> {
    let key = user.policy_key().ok_or(PolicyError::MissingUserKey)?.to_string();
    pdp.sync_user(user, sync).await?;
    pdp.assign_role(user, &Role::MEMBER, tenant).await?;
    tracing::info!(user = %key, tenant, "user synced with policy service and assigned 'member' role");
    Ok(())
}
