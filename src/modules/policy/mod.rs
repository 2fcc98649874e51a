//! Pure authorization decisions. No I/O: everything the rules need arrives
//! through the arguments, so identical inputs always produce the identical
//! decision and the whole rule table can be enumerated in tests.
//!
//! Precedence, first match wins:
//! 1. unauthenticated callers may only log in
//! 2. maintenance mode locks out everyone but admins
//! 3. owners get read/update/delete/visibility-toggle on their own files
//! 4. admins get read/delete anywhere plus user management, except demoting
//!    or deleting themselves or the seed admin
//! 5. anyone authenticated may read public files
//! 6. deny

use crate::api::error::SystemError;
use crate::modules::file::schema::{FileEntity, FileVisibility};
use crate::modules::user::schema::{UserEntity, UserRole};

/// The authenticated caller, as resolved from a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: i64,
    pub role: UserRole,
}

/// What the rules need to know about a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileRef {
    pub owner_id: Option<i64>,
    pub visibility: FileVisibility,
}

impl From<&FileEntity> for FileRef {
    fn from(file: &FileEntity) -> Self {
        FileRef { owner_id: file.owner_id, visibility: file.visibility }
    }
}

/// What the rules need to know about a target user account.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserRef {
    pub id: i64,
    pub role: UserRole,
    pub is_seed_admin: bool,
}

impl From<&UserEntity> for UserRef {
    fn from(user: &UserEntity) -> Self {
        UserRef { id: user.id, role: user.role, is_seed_admin: user.is_seed_admin }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resource {
    File(FileRef),
    User(UserRef),
    Logs,
    Settings,
    /// Operations without a pre-existing target: login, upload, listings,
    /// user creation.
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Login,
    Read,
    Update,
    Delete,
    ToggleVisibility,
    Upload,
    ListFiles,
    ListAllFiles,
    ListUsers,
    CreateUser,
    UpdateRole { to: UserRole },
    UpdateStatus,
    ResetPassword,
    DeleteUser,
    ViewLogs,
    ManageSettings,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DenyReason {
    NotAuthenticated,
    Maintenance,
    ProtectedAdmin,
    InsufficientPermission,
}

impl DenyReason {
    pub fn message(self) -> &'static str {
        match self {
            DenyReason::NotAuthenticated => "authentication required",
            DenyReason::Maintenance => "maintenance mode is enabled",
            DenyReason::ProtectedAdmin => "this admin account cannot be demoted or deleted",
            DenyReason::InsufficientPermission => "insufficient permission",
        }
    }

    pub fn into_error(self) -> SystemError {
        match self {
            DenyReason::NotAuthenticated => SystemError::AuthenticationRequired,
            other => SystemError::permission_denied(other.message()),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny(DenyReason),
}

impl Decision {
    /// Ok on Allow so call sites can `?` after recording the denial.
    pub fn require(self) -> Result<(), DenyReason> {
        match self {
            Decision::Allow => Ok(()),
            Decision::Deny(reason) => Err(reason),
        }
    }
}

/// Settings snapshot the rules depend on, read fresh by the caller at the
/// moment of the operation.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PolicyContext {
    pub maintenance_mode: bool,
}

pub fn authorize(
    ctx: PolicyContext,
    actor: Option<&Actor>,
    resource: &Resource,
    action: Action,
) -> Decision {
    // Rule 1: unauthenticated callers get login and nothing else.
    let Some(actor) = actor else {
        if action == Action::Login {
            return Decision::Allow;
        }
        return Decision::Deny(DenyReason::NotAuthenticated);
    };

    // Rule 2: maintenance mode locks out non-admins entirely.
    if ctx.maintenance_mode && actor.role != UserRole::Admin {
        return Decision::Deny(DenyReason::Maintenance);
    }

    // Rule 3: file owners manage their own files.
    if let Resource::File(file) = resource {
        if file.owner_id == Some(actor.id)
            && matches!(
                action,
                Action::Read | Action::Update | Action::Delete | Action::ToggleVisibility
            )
        {
            return Decision::Allow;
        }
    }

    // Rule 4: admin powers, minus self- and seed-admin demolition.
    if actor.role == UserRole::Admin {
        match (resource, action) {
            (Resource::File(_), Action::Read | Action::Delete) => return Decision::Allow,
            (Resource::User(target), action) => {
                let protected = target.id == actor.id || target.is_seed_admin;
                match action {
                    Action::DeleteUser | Action::Delete if protected => {
                        return Decision::Deny(DenyReason::ProtectedAdmin)
                    }
                    Action::UpdateRole { to: UserRole::User } if protected => {
                        return Decision::Deny(DenyReason::ProtectedAdmin)
                    }
                    Action::Read
                    | Action::Delete
                    | Action::DeleteUser
                    | Action::UpdateRole { .. }
                    | Action::UpdateStatus
                    | Action::ResetPassword => return Decision::Allow,
                    _ => {}
                }
            }
            (Resource::Logs, Action::ViewLogs | Action::Read) => return Decision::Allow,
            (Resource::Settings, Action::ManageSettings | Action::Read) => return Decision::Allow,
            (
                Resource::System,
                Action::CreateUser | Action::ListUsers | Action::ListAllFiles,
            ) => return Decision::Allow,
            _ => {}
        }
    }

    // Rule 5: public files are readable by anyone authenticated.
    if let Resource::File(file) = resource {
        if file.visibility == FileVisibility::Public && action == Action::Read {
            return Decision::Allow;
        }
    }

    // Every authenticated, non-locked-out user may upload, list files, and
    // read or update their own account.
    match (resource, action) {
        (Resource::System, Action::Upload | Action::ListFiles | Action::Login) => {
            return Decision::Allow
        }
        (Resource::User(target), Action::Read | Action::Update) if target.id == actor.id => {
            return Decision::Allow
        }
        _ => {}
    }

    // Rule 6.
    Decision::Deny(DenyReason::InsufficientPermission)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(id: i64) -> Actor {
        Actor { id, role: UserRole::User }
    }

    fn admin(id: i64) -> Actor {
        Actor { id, role: UserRole::Admin }
    }

    fn file(owner: Option<i64>, visibility: FileVisibility) -> Resource {
        Resource::File(FileRef { owner_id: owner, visibility })
    }

    const FILE_ACTIONS: [Action; 4] =
        [Action::Read, Action::Update, Action::Delete, Action::ToggleVisibility];

    #[test]
    fn unauthenticated_can_only_login() {
        let all = [
            Action::Login,
            Action::Read,
            Action::Update,
            Action::Delete,
            Action::ToggleVisibility,
            Action::Upload,
            Action::ListFiles,
            Action::ListAllFiles,
            Action::ListUsers,
            Action::CreateUser,
            Action::UpdateRole { to: UserRole::User },
            Action::UpdateStatus,
            Action::ResetPassword,
            Action::DeleteUser,
            Action::ViewLogs,
            Action::ManageSettings,
        ];
        for action in all {
            let decision =
                authorize(PolicyContext::default(), None, &Resource::System, action);
            if action == Action::Login {
                assert_eq!(decision, Decision::Allow);
            } else {
                assert_eq!(decision, Decision::Deny(DenyReason::NotAuthenticated), "{action:?}");
            }
        }
    }

    #[test]
    fn maintenance_locks_out_non_admins_before_ownership() {
        let ctx = PolicyContext { maintenance_mode: true };
        let owner = user(1);
        let own_file = file(Some(1), FileVisibility::Public);
        for action in FILE_ACTIONS {
            assert_eq!(
                authorize(ctx, Some(&owner), &own_file, action),
                Decision::Deny(DenyReason::Maintenance)
            );
        }
        // Admins keep working.
        assert_eq!(
            authorize(ctx, Some(&admin(2)), &own_file, Action::Read),
            Decision::Allow
        );
        // Maintenance also blocks a non-admin completing a login.
        assert_eq!(
            authorize(ctx, Some(&user(1)), &Resource::System, Action::Login),
            Decision::Deny(DenyReason::Maintenance)
        );
        assert_eq!(
            authorize(ctx, Some(&admin(2)), &Resource::System, Action::Login),
            Decision::Allow
        );
    }

    /// The full (role x ownership x visibility x action) table for files.
    #[test]
    fn file_decision_table_is_exhaustive() {
        let ctx = PolicyContext::default();
        let roles = [UserRole::User, UserRole::Admin];
        let ownerships = [Some(1i64), Some(2i64), None];
        let visibilities = [FileVisibility::Private, FileVisibility::Public];

        for role in roles {
            for owner in ownerships {
                for visibility in visibilities {
                    for action in FILE_ACTIONS {
                        let actor = Actor { id: 1, role };
                        let resource = file(owner, visibility);
                        let decision = authorize(ctx, Some(&actor), &resource, action);

                        let is_owner = owner == Some(actor.id);
                        let expected = if is_owner {
                            Decision::Allow
                        } else if role == UserRole::Admin
                            && matches!(action, Action::Read | Action::Delete)
                        {
                            Decision::Allow
                        } else if visibility == FileVisibility::Public && action == Action::Read {
                            Decision::Allow
                        } else {
                            Decision::Deny(DenyReason::InsufficientPermission)
                        };
                        assert_eq!(
                            decision, expected,
                            "role={role:?} owner={owner:?} vis={visibility:?} action={action:?}"
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn decisions_are_deterministic() {
        let ctx = PolicyContext::default();
        let actor = user(7);
        let resource = file(Some(9), FileVisibility::Private);
        let first = authorize(ctx, Some(&actor), &resource, Action::Read);
        for _ in 0..100 {
            assert_eq!(first, authorize(ctx, Some(&actor), &resource, Action::Read));
        }
    }

    #[test]
    fn admin_cannot_demote_or_delete_self() {
        let ctx = PolicyContext::default();
        let actor = admin(1);
        let me = Resource::User(UserRef { id: 1, role: UserRole::Admin, is_seed_admin: false });
        assert_eq!(
            authorize(ctx, Some(&actor), &me, Action::DeleteUser),
            Decision::Deny(DenyReason::ProtectedAdmin)
        );
        assert_eq!(
            authorize(ctx, Some(&actor), &me, Action::UpdateRole { to: UserRole::User }),
            Decision::Deny(DenyReason::ProtectedAdmin)
        );
        // Re-asserting the admin role on yourself is a no-op, not a demotion.
        assert_eq!(
            authorize(ctx, Some(&actor), &me, Action::UpdateRole { to: UserRole::Admin }),
            Decision::Allow
        );
    }

    #[test]
    fn seed_admin_is_protected_from_everyone() {
        let ctx = PolicyContext::default();
        let actor = admin(2);
        let seed = Resource::User(UserRef { id: 1, role: UserRole::Admin, is_seed_admin: true });
        assert_eq!(
            authorize(ctx, Some(&actor), &seed, Action::DeleteUser),
            Decision::Deny(DenyReason::ProtectedAdmin)
        );
        assert_eq!(
            authorize(ctx, Some(&actor), &seed, Action::UpdateRole { to: UserRole::User }),
            Decision::Deny(DenyReason::ProtectedAdmin)
        );
        // Status and password stay manageable; only demote/delete are fenced.
        assert_eq!(authorize(ctx, Some(&actor), &seed, Action::UpdateStatus), Decision::Allow);
        assert_eq!(authorize(ctx, Some(&actor), &seed, Action::ResetPassword), Decision::Allow);
    }

    #[test]
    fn admin_manages_ordinary_users() {
        let ctx = PolicyContext::default();
        let actor = admin(2);
        let target = Resource::User(UserRef { id: 5, role: UserRole::User, is_seed_admin: false });
        for action in [
            Action::Read,
            Action::UpdateRole { to: UserRole::Admin },
            Action::UpdateRole { to: UserRole::User },
            Action::UpdateStatus,
            Action::ResetPassword,
            Action::DeleteUser,
        ] {
            assert_eq!(authorize(ctx, Some(&actor), &target, action), Decision::Allow, "{action:?}");
        }
    }

    #[test]
    fn non_admins_get_no_management_surface() {
        let ctx = PolicyContext::default();
        let actor = user(5);
        let other = Resource::User(UserRef { id: 6, role: UserRole::User, is_seed_admin: false });
        let denied = Decision::Deny(DenyReason::InsufficientPermission);
        assert_eq!(authorize(ctx, Some(&actor), &other, Action::Read), denied);
        assert_eq!(authorize(ctx, Some(&actor), &other, Action::DeleteUser), denied);
        assert_eq!(authorize(ctx, Some(&actor), &Resource::Logs, Action::ViewLogs), denied);
        assert_eq!(authorize(ctx, Some(&actor), &Resource::Settings, Action::ManageSettings), denied);
        assert_eq!(authorize(ctx, Some(&actor), &Resource::System, Action::CreateUser), denied);
        assert_eq!(authorize(ctx, Some(&actor), &Resource::System, Action::ListAllFiles), denied);
        // But everyone authenticated can read and update their own account,
        // upload, and list what is visible to them.
        let own = Resource::User(UserRef { id: 5, role: UserRole::User, is_seed_admin: false });
        assert_eq!(authorize(ctx, Some(&actor), &own, Action::Read), Decision::Allow);
        assert_eq!(authorize(ctx, Some(&actor), &own, Action::Update), Decision::Allow);
        assert_eq!(authorize(ctx, Some(&actor), &Resource::System, Action::Upload), Decision::Allow);
        assert_eq!(
            authorize(ctx, Some(&actor), &Resource::System, Action::ListFiles),
            Decision::Allow
        );
    }

    #[test]
    fn deny_reasons_map_to_taxonomy() {
        assert!(matches!(
            DenyReason::NotAuthenticated.into_error(),
            SystemError::AuthenticationRequired
        ));
        assert!(matches!(
            DenyReason::InsufficientPermission.into_error(),
            SystemError::PermissionDenied(msg) if msg == "insufficient permission"
        ));
    }
}
