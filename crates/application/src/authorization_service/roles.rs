use super::*;

impl AuthorizationService {
    /// Returns whether the user holds the role. Role names match exactly.
    pub async fn has_role(&self, user_id: UserId, role_name: &str) -> bool {
        self.resolve_or_deny(user_id)
            .await
            .is_some_and(|set| set.has_role(role_name))
    }

    /// Returns whether the user holds at least one of the roles.
    pub async fn has_any_role(&self, user_id: UserId, role_names: &[&str]) -> bool {
        if role_names.is_empty() {
            return false;
        }

        self.resolve_or_deny(user_id)
            .await
            .is_some_and(|set| role_names.iter().any(|role_name| set.has_role(role_name)))
    }

    /// Returns whether the user holds every one of the roles.
    pub async fn has_all_roles(&self, user_id: UserId, role_names: &[&str]) -> bool {
        if role_names.is_empty() {
            return true;
        }

        self.resolve_or_deny(user_id)
            .await
            .is_some_and(|set| role_names.iter().all(|role_name| set.has_role(role_name)))
    }
}
