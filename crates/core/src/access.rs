//! Access policy: who may do what to which resource.
//!
//! [`decide`] is the single place where role and ownership rules live. The
//! API layer maps a [`Decision::Deny`] to 401 for anonymous callers and 403
//! for everyone else.

use crate::authored::Authored;
use crate::roles::Role;
use crate::types::DbId;

/// The caller of a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Actor {
    Anonymous,
    User { id: DbId, role: Role },
}

/// REST verbs collapsed into the actions the policy distinguishes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    List,
    Retrieve,
    Create,
    Update,
    Delete,
}

impl Action {
    pub fn is_read_only(self) -> bool {
        matches!(self, Action::List | Action::Retrieve)
    }
}

/// What the action targets, reduced to the facts the policy needs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    /// Categories, genres and titles. Nobody owns them.
    Catalog,
    /// A review or comment that does not exist yet.
    NewAuthored,
    /// An existing review or comment.
    Authored { author_id: DbId },
    /// The account directory as a whole (listing, admin account creation).
    UserDirectory,
    /// A single account profile.
    Profile { owner_id: DbId, changes_role: bool },
}

impl Resource {
    pub fn authored(item: &impl Authored) -> Self {
        Resource::Authored {
            author_id: item.author_id(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        self == Decision::Allow
    }

    fn from_bool(allowed: bool) -> Self {
        if allowed {
            Decision::Allow
        } else {
            Decision::Deny
        }
    }
}

/// Decide whether `actor` may perform `action` on `resource`.
///
/// Rules are evaluated in order; the first that applies wins.
pub fn decide(actor: &Actor, action: Action, resource: &Resource) -> Decision {
    if action.is_read_only() {
        return Decision::Allow;
    }

    let (actor_id, role) = match actor {
        Actor::Anonymous => return Decision::Deny,
        Actor::User { id, role } => (*id, *role),
    };

    let allowed = match *resource {
        Resource::NewAuthored => action == Action::Create,
        Resource::Authored { author_id } => author_id == actor_id || role.is_staff(),
        Resource::Catalog | Resource::UserDirectory => role.is_admin(),
        Resource::Profile {
            owner_id,
            changes_role,
        } => {
            if changes_role || owner_id != actor_id {
                role.is_admin()
            } else {
                true
            }
        }
    };

    Decision::from_bool(allowed)
}

#[cfg(test)]
mod tests {
    use super::*;

    const AUTHOR: DbId = 1;
    const OTHER: DbId = 2;

    fn user(id: DbId, role: Role) -> Actor {
        Actor::User { id, role }
    }

    const MUTATIONS: [Action; 3] = [Action::Create, Action::Update, Action::Delete];

    #[test]
    fn reads_are_always_allowed() {
        let resources = [
            Resource::Catalog,
            Resource::NewAuthored,
            Resource::Authored { author_id: AUTHOR },
            Resource::UserDirectory,
            Resource::Profile {
                owner_id: AUTHOR,
                changes_role: false,
            },
        ];
        for resource in resources {
            for action in [Action::List, Action::Retrieve] {
                assert_eq!(decide(&Actor::Anonymous, action, &resource), Decision::Allow);
                assert_eq!(
                    decide(&user(OTHER, Role::User), action, &resource),
                    Decision::Allow
                );
            }
        }
    }

    #[test]
    fn anonymous_cannot_mutate_anything() {
        for action in MUTATIONS {
            assert_eq!(
                decide(&Actor::Anonymous, action, &Resource::NewAuthored),
                Decision::Deny
            );
            assert_eq!(
                decide(&Actor::Anonymous, action, &Resource::Catalog),
                Decision::Deny
            );
        }
    }

    #[test]
    fn any_user_may_create_authored_content() {
        for role in [Role::User, Role::Moderator, Role::Admin] {
            assert!(decide(&user(OTHER, role), Action::Create, &Resource::NewAuthored).is_allowed());
        }
    }

    #[test]
    fn author_may_edit_own_review() {
        let review = Resource::Authored { author_id: AUTHOR };
        assert!(decide(&user(AUTHOR, Role::User), Action::Update, &review).is_allowed());
        assert!(decide(&user(AUTHOR, Role::User), Action::Delete, &review).is_allowed());
    }

    #[test]
    fn plain_user_cannot_edit_someone_elses_review() {
        let review = Resource::Authored { author_id: AUTHOR };
        assert_eq!(
            decide(&user(OTHER, Role::User), Action::Update, &review),
            Decision::Deny
        );
        assert_eq!(
            decide(&user(OTHER, Role::User), Action::Delete, &review),
            Decision::Deny
        );
    }

    #[test]
    fn moderators_and_admins_may_edit_any_review() {
        let review = Resource::Authored { author_id: AUTHOR };
        for role in [Role::Moderator, Role::Admin] {
            assert!(decide(&user(OTHER, role), Action::Update, &review).is_allowed());
            assert!(decide(&user(OTHER, role), Action::Delete, &review).is_allowed());
        }
    }

    #[test]
    fn catalog_mutation_is_admin_only() {
        for action in MUTATIONS {
            assert_eq!(
                decide(&user(OTHER, Role::User), action, &Resource::Catalog),
                Decision::Deny
            );
            assert_eq!(
                decide(&user(OTHER, Role::Moderator), action, &Resource::Catalog),
                Decision::Deny
            );
            assert!(decide(&user(OTHER, Role::Admin), action, &Resource::Catalog).is_allowed());
        }
    }

    #[test]
    fn account_creation_is_admin_only() {
        assert_eq!(
            decide(&user(OTHER, Role::Moderator), Action::Create, &Resource::UserDirectory),
            Decision::Deny
        );
        assert!(
            decide(&user(OTHER, Role::Admin), Action::Create, &Resource::UserDirectory)
                .is_allowed()
        );
    }

    #[test]
    fn self_profile_edit_without_role_change_is_allowed() {
        let profile = Resource::Profile {
            owner_id: AUTHOR,
            changes_role: false,
        };
        assert!(decide(&user(AUTHOR, Role::User), Action::Update, &profile).is_allowed());
    }

    #[test]
    fn self_role_change_requires_admin() {
        let profile = Resource::Profile {
            owner_id: AUTHOR,
            changes_role: true,
        };
        assert_eq!(
            decide(&user(AUTHOR, Role::User), Action::Update, &profile),
            Decision::Deny
        );
        assert_eq!(
            decide(&user(AUTHOR, Role::Moderator), Action::Update, &profile),
            Decision::Deny
        );
        assert!(decide(&user(AUTHOR, Role::Admin), Action::Update, &profile).is_allowed());
    }

    #[test]
    fn only_admin_may_edit_another_profile() {
        let profile = Resource::Profile {
            owner_id: AUTHOR,
            changes_role: false,
        };
        assert_eq!(
            decide(&user(OTHER, Role::Moderator), Action::Update, &profile),
            Decision::Deny
        );
        assert_eq!(
            decide(&user(OTHER, Role::Moderator), Action::Delete, &profile),
            Decision::Deny
        );
        assert!(decide(&user(OTHER, Role::Admin), Action::Delete, &profile).is_allowed());
    }

    #[test]
    fn unknown_stored_role_gets_no_elevated_access() {
        let actor = user(OTHER, Role::from_stored(Some("superadmin")));
        let review = Resource::Authored { author_id: AUTHOR };
        assert_eq!(decide(&actor, Action::Delete, &review), Decision::Deny);
        assert_eq!(decide(&actor, Action::Create, &Resource::Catalog), Decision::Deny);
    }
}
