//! Role and ownership decisions.
//!
//! Every mutation or single-resource read funnels through [`decide`];
//! list endpoints are instead query-scoped by owner id before they hit
//! the database. Route-level role requirements live in one declarative
//! table consulted by the auth middleware rather than per handler.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_USER: &str = "user";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

/// Role-and-ownership check: admins act on anyone's resources, everyone
/// else only on their own.
pub fn decide(roles: &[String], actor_id: i32, resource_owner_id: i32) -> Decision {
    if roles.iter().any(|r| r == ROLE_ADMIN) || actor_id == resource_owner_id {
        Decision::Allow
    } else {
        Decision::Deny
    }
}

/// Route prefix → role required to pass the middleware. First match wins.
const ROUTE_ROLES: &[(&str, &str)] = &[("/api/admin", ROLE_ADMIN)];

/// The role a request path requires beyond authentication, if any.
pub fn required_role(path: &str) -> Option<&'static str> {
    ROUTE_ROLES
        .iter()
        .find(|(prefix, _)| path.starts_with(prefix))
        .map(|(_, role)| *role)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|n| n.to_string()).collect()
    }

    #[test]
    fn test_admin_allowed_on_any_owner() {
        assert_eq!(decide(&roles(&["admin"]), 1, 99), Decision::Allow);
        assert_eq!(decide(&roles(&["user", "admin"]), 1, 1), Decision::Allow);
    }

    #[test]
    fn test_user_allowed_on_own_resource() {
        assert_eq!(decide(&roles(&["user"]), 7, 7), Decision::Allow);
    }

    #[test]
    fn test_user_denied_on_foreign_resource() {
        assert_eq!(decide(&roles(&["user"]), 7, 8), Decision::Deny);
        assert_eq!(decide(&roles(&[]), 7, 8), Decision::Deny);
    }

    #[test]
    fn test_admin_routes_require_admin_role() {
        assert_eq!(required_role("/api/admin/tasks"), Some(ROLE_ADMIN));
        assert_eq!(required_role("/api/admin/users/3"), Some(ROLE_ADMIN));
        assert_eq!(required_role("/api/tasks"), None);
        assert_eq!(required_role("/api/users/me"), None);
        assert_eq!(required_role("/health"), None);
    }
}
