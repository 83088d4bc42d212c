//! Property tests for the permission table and targeting rules

use domain_access::permissions::{
    authorize_create, authorize_delete, authorize_update, can_act_on, can_assign_role, is_allowed,
};
use domain_access::{AccessError, Action, Actor, Role, UserUpdate};
use core_kernel::UserId;
use proptest::prelude::*;
use proptest::sample::select;

fn role() -> impl Strategy<Value = Role> {
    select(Role::ALL.to_vec())
}

fn action() -> impl Strategy<Value = Action> {
    select(Action::ALL.to_vec())
}

proptest! {
    #[test]
    fn self_delete_is_never_allowed(actor_role in role()) {
        let actor = Actor::new(UserId::new(), actor_role);
        let result = authorize_delete(&actor, actor.id, actor_role);
        prop_assert!(matches!(result, Err(AccessError::Forbidden(_))));
    }

    #[test]
    fn only_superadmin_assigns_superadmin(actor_role in role()) {
        prop_assert_eq!(
            can_assign_role(actor_role, Role::Superadmin),
            actor_role == Role::Superadmin
        );
    }

    #[test]
    fn creation_needs_assignable_role(actor_role in role(), target in role()) {
        let actor = Actor::new(UserId::new(), actor_role);
        let allowed = authorize_create(&actor, target).is_ok();
        prop_assert_eq!(
            allowed,
            is_allowed(actor_role, Action::UsersManage) && can_assign_role(actor_role, target)
        );
    }

    #[test]
    fn own_role_is_immutable(actor_role in role(), wanted in role()) {
        prop_assume!(actor_role != wanted);
        let actor = Actor::new(UserId::new(), actor_role);
        let change = UserUpdate { role: Some(wanted), ..Default::default() };
        prop_assert!(authorize_update(&actor, actor.id, actor_role, true, &change).is_err());
    }

    #[test]
    fn everyone_may_act_on_self(actor_role in role()) {
        let actor = Actor::new(UserId::new(), actor_role);
        prop_assert!(can_act_on(&actor, actor.id, actor_role));
    }

    #[test]
    fn admin_and_superadmin_share_the_action_table(a in action()) {
        prop_assert_eq!(is_allowed(Role::Admin, a), is_allowed(Role::Superadmin, a));
    }
}

#[test]
fn register_holds_seven_actions() {
    let count = Action::ALL
        .iter()
        .filter(|a| is_allowed(Role::Register, **a))
        .count();
    assert_eq!(count, 7);
}
