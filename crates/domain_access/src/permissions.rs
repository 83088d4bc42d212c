//! Permission table and account-targeting rules
//!
//! Every authorization decision in the system is answered here:
//!
//! - [`is_allowed`] looks up a (role, action) pair in [`PERMISSIONS`]
//! - the `authorize_*` functions decide whether an actor may create, edit or
//!   delete a particular account
//!
//! # Account targeting
//!
//! - superadmin may assign any role and act on any account
//! - admin may assign `admin` or `register`, and act only on `register`
//!   accounts besides its own
//! - register may assign nothing
//! - anyone may edit their own username, email and password, never their own
//!   role or active flag
//! - nobody may delete their own account

use std::fmt;

use serde::Serialize;

use core_kernel::UserId;

use crate::error::AccessError;
use crate::role::Role;
use crate::user::UserUpdate;

/// Operations guarded by the permission table
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub enum Action {
    #[serde(rename = "clients.read")]
    ClientsRead,
    #[serde(rename = "clients.write")]
    ClientsWrite,
    #[serde(rename = "clients.delete")]
    ClientsDelete,
    #[serde(rename = "policies.read")]
    PoliciesRead,
    #[serde(rename = "policies.write")]
    PoliciesWrite,
    #[serde(rename = "policies.renew")]
    PoliciesRenew,
    #[serde(rename = "policies.delete")]
    PoliciesDelete,
    #[serde(rename = "coverages.read")]
    CoveragesRead,
    #[serde(rename = "coverages.write")]
    CoveragesWrite,
    #[serde(rename = "coverages.delete")]
    CoveragesDelete,
    #[serde(rename = "users.read")]
    UsersRead,
    #[serde(rename = "users.manage")]
    UsersManage,
    #[serde(rename = "dashboard.read")]
    DashboardRead,
}

impl Action {
    pub const ALL: [Action; 13] = [
        Action::ClientsRead,
        Action::ClientsWrite,
        Action::ClientsDelete,
        Action::PoliciesRead,
        Action::PoliciesWrite,
        Action::PoliciesRenew,
        Action::PoliciesDelete,
        Action::CoveragesRead,
        Action::CoveragesWrite,
        Action::CoveragesDelete,
        Action::UsersRead,
        Action::UsersManage,
        Action::DashboardRead,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Action::ClientsRead => "clients.read",
            Action::ClientsWrite => "clients.write",
            Action::ClientsDelete => "clients.delete",
            Action::PoliciesRead => "policies.read",
            Action::PoliciesWrite => "policies.write",
            Action::PoliciesRenew => "policies.renew",
            Action::PoliciesDelete => "policies.delete",
            Action::CoveragesRead => "coverages.read",
            Action::CoveragesWrite => "coverages.write",
            Action::CoveragesDelete => "coverages.delete",
            Action::UsersRead => "users.read",
            Action::UsersManage => "users.manage",
            Action::DashboardRead => "dashboard.read",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

const REGISTER_ACTIONS: &[Action] = &[
    Action::ClientsRead,
    Action::ClientsWrite,
    Action::PoliciesRead,
    Action::PoliciesWrite,
    Action::PoliciesRenew,
    Action::CoveragesRead,
    Action::DashboardRead,
];

/// The (role, action) table
pub const PERMISSIONS: &[(Role, &[Action])] = &[
    (Role::Superadmin, &Action::ALL),
    (Role::Admin, &Action::ALL),
    (Role::Register, REGISTER_ACTIONS),
];

/// Returns true if `role` may perform `action`
pub fn is_allowed(role: Role, action: Action) -> bool {
    PERMISSIONS
        .iter()
        .find(|(r, _)| *r == role)
        .is_some_and(|(_, actions)| actions.contains(&action))
}

/// Fails with `Forbidden` unless `role` may perform `action`
pub fn require(role: Role, action: Action) -> Result<(), AccessError> {
    if is_allowed(role, action) {
        Ok(())
    } else {
        Err(AccessError::forbidden(format!(
            "role {role} may not perform {action}"
        )))
    }
}

/// The authenticated caller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Actor {
    pub id: UserId,
    pub role: Role,
}

impl Actor {
    pub fn new(id: UserId, role: Role) -> Self {
        Self { id, role }
    }
}

/// Returns true if a `actor` may hand out `role`
pub fn can_assign_role(actor: Role, role: Role) -> bool {
    match actor {
        Role::Superadmin => true,
        Role::Admin => matches!(role, Role::Admin | Role::Register),
        Role::Register => false,
    }
}

/// Returns true if `actor` may manage the account `(target_id, target_role)`
pub fn can_act_on(actor: &Actor, target_id: UserId, target_role: Role) -> bool {
    if actor.id == target_id {
        return true;
    }
    match actor.role {
        Role::Superadmin => true,
        Role::Admin => target_role == Role::Register,
        Role::Register => false,
    }
}

/// Checks that `actor` may create an account with `role`
pub fn authorize_create(actor: &Actor, role: Role) -> Result<(), AccessError> {
    require(actor.role, Action::UsersManage)?;
    if !can_assign_role(actor.role, role) {
        return Err(AccessError::forbidden(format!(
            "role {} may not assign role {role}",
            actor.role
        )));
    }
    Ok(())
}

/// Checks that `actor` may apply `change` to the account `(target_id, target_role)`
pub fn authorize_update(
    actor: &Actor,
    target_id: UserId,
    target_role: Role,
    target_active: bool,
    change: &UserUpdate,
) -> Result<(), AccessError> {
    let role_change = change.role.filter(|role| *role != target_role);
    let active_change = change.is_active.filter(|active| *active != target_active);

    if actor.id == target_id {
        if role_change.is_some() {
            return Err(AccessError::forbidden("you cannot change your own role"));
        }
        if active_change.is_some() {
            return Err(AccessError::forbidden("you cannot change your own active flag"));
        }
        return Ok(());
    }

    require(actor.role, Action::UsersManage)?;
    if !can_act_on(actor, target_id, target_role) {
        return Err(AccessError::forbidden(format!(
            "role {} may not modify a {target_role} account",
            actor.role
        )));
    }
    if let Some(role) = role_change {
        if !can_assign_role(actor.role, role) {
            return Err(AccessError::forbidden(format!(
                "role {} may not assign role {role}",
                actor.role
            )));
        }
    }
    Ok(())
}

/// Checks that `actor` may delete the account `(target_id, target_role)`
pub fn authorize_delete(
    actor: &Actor,
    target_id: UserId,
    target_role: Role,
) -> Result<(), AccessError> {
    if actor.id == target_id {
        return Err(AccessError::forbidden("you cannot delete your own account"));
    }
    require(actor.role, Action::UsersManage)?;
    if !can_act_on(actor, target_id, target_role) {
        return Err(AccessError::forbidden(format!(
            "role {} may not delete a {target_role} account",
            actor.role
        )));
    }
    Ok(())
}
