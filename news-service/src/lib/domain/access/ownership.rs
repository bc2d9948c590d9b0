use crate::domain::access::policy::Decision;
use crate::domain::access::policy::DenyReason;
use crate::domain::user::models::Principal;
use crate::domain::user::models::UserId;

/// Content written by a user (articles, comments).
pub trait Authored {
    fn author_id(&self) -> UserId;
}

/// Fine-grained check for updating or deleting authored content.
///
/// Runs inside the handler once the resource is loaded, after the route policy has
/// already allowed the request. Only the author or an admin may modify.
pub fn ensure_can_modify<R: Authored + ?Sized>(principal: &Principal, resource: &R) -> Decision {
    if principal.is_admin() || resource.author_id() == principal.id {
        Decision::Allow
    } else {
        Decision::Deny(DenyReason::Forbidden)
    }
}
