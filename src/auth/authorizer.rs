//! Pure role/ownership authorization decisions.
//!
//! Deterministic given (role, operation, ownership facts); no I/O.

use crate::domain::{OwnershipFacts, Role, SubjectId};

/// Operation requested against an appointment resource.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    Create,
    Read,
    Update,
    Delete,
}

/// Outcome of an authorization check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Collection-level query scope for a caller.
///
/// A descriptor, not data: the store turns it into a filtered query.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryScope {
    All,
    AssignedToStaff(SubjectId),
    OwnedByClient(SubjectId),
}

/// Decide whether `caller` with `role` may perform `operation` on the
/// resource described by `resource`.
///
/// Unrecognized roles deny everything.
pub fn authorize(
    role: &Role,
    caller: &SubjectId,
    operation: Operation,
    resource: Option<&OwnershipFacts>,
) -> Decision {
    // Creation is a client-type action: the owner of the new record is
    // always the caller, so only clients create.
    if operation == Operation::Create {
        return match role {
            Role::Client => Decision::Allow,
            _ => Decision::Deny,
        };
    }

    match role {
        Role::Admin => Decision::Allow,
        Role::Staff => match resource {
            Some(facts) if facts.assigned_staff.as_ref() == Some(caller) => Decision::Allow,
            _ => Decision::Deny,
        },
        Role::Client => match resource {
            Some(facts) if &facts.owner == caller => Decision::Allow,
            _ => Decision::Deny,
        },
        Role::Unknown(_) => Decision::Deny,
    }
}

/// Listing scope for a caller: admins see everything, staff their assigned
/// resources, clients their own. `None` means no access at all.
pub fn collection_scope(role: &Role, caller: &SubjectId) -> Option<QueryScope> {
    match role {
        Role::Admin => Some(QueryScope::All),
        Role::Staff => Some(QueryScope::AssignedToStaff(caller.clone())),
        Role::Client => Some(QueryScope::OwnedByClient(caller.clone())),
        Role::Unknown(_) => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const OBJECT_OPS: [Operation; 3] = [Operation::Read, Operation::Update, Operation::Delete];

    fn facts(owner: &str, staff: Option<&str>) -> OwnershipFacts {
        OwnershipFacts {
            owner: SubjectId::new(owner),
            assigned_staff: staff.map(SubjectId::new),
        }
    }

    #[test]
    fn test_admin_allows_all_object_operations() {
        let caller = SubjectId::new("a1");
        for op in OBJECT_OPS {
            assert_eq!(
                authorize(&Role::Admin, &caller, op, Some(&facts("c1", Some("s1")))),
                Decision::Allow
            );
            assert_eq!(authorize(&Role::Admin, &caller, op, None), Decision::Allow);
        }
    }

    #[test]
    fn test_staff_allows_only_assigned() {
        let caller = SubjectId::new("s1");
        for op in OBJECT_OPS {
            assert_eq!(
                authorize(&Role::Staff, &caller, op, Some(&facts("c1", Some("s1")))),
                Decision::Allow
            );
            assert_eq!(
                authorize(&Role::Staff, &caller, op, Some(&facts("c1", Some("s2")))),
                Decision::Deny
            );
            assert_eq!(
                authorize(&Role::Staff, &caller, op, Some(&facts("c1", None))),
                Decision::Deny
            );
            assert_eq!(authorize(&Role::Staff, &caller, op, None), Decision::Deny);
        }
    }

    #[test]
    fn test_client_allows_only_owned() {
        let caller = SubjectId::new("c1");
        for op in OBJECT_OPS {
            assert_eq!(
                authorize(&Role::Client, &caller, op, Some(&facts("c1", None))),
                Decision::Allow
            );
            assert_eq!(
                authorize(&Role::Client, &caller, op, Some(&facts("c2", Some("c1")))),
                Decision::Deny
            );
            assert_eq!(authorize(&Role::Client, &caller, op, None), Decision::Deny);
        }
    }

    #[test]
    fn test_only_clients_create() {
        let caller = SubjectId::new("x");
        assert_eq!(
            authorize(&Role::Client, &caller, Operation::Create, None),
            Decision::Allow
        );
        assert_eq!(
            authorize(&Role::Staff, &caller, Operation::Create, None),
            Decision::Deny
        );
        assert_eq!(
            authorize(&Role::Admin, &caller, Operation::Create, None),
            Decision::Deny
        );
    }

    #[test]
    fn test_unknown_role_denies_everything() {
        let caller = SubjectId::new("x");
        let role = Role::parse("superuser");
        for op in [Operation::Create, Operation::Read, Operation::Update, Operation::Delete] {
            assert_eq!(
                authorize(&role, &caller, op, Some(&facts("x", Some("x")))),
                Decision::Deny
            );
        }
        assert_eq!(collection_scope(&role, &caller), None);
    }

    #[test]
    fn test_collection_scopes() {
        let caller = SubjectId::new("u1");
        assert_eq!(collection_scope(&Role::Admin, &caller), Some(QueryScope::All));
        assert_eq!(
            collection_scope(&Role::Staff, &caller),
            Some(QueryScope::AssignedToStaff(caller.clone()))
        );
        assert_eq!(
            collection_scope(&Role::Client, &caller),
            Some(QueryScope::OwnedByClient(caller.clone()))
        );
    }
}
