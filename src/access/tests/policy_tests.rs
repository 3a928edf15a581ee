//! Policy table and authorisation tests.

use crate::access::{AccessError, AccessRole, Action, IDEA_POLICY, PROJECT_POLICY, TASK_POLICY};
use rstest::rstest;

#[rstest]
fn missing_role_is_reported_as_not_visible() {
    assert_eq!(
        PROJECT_POLICY.authorize(None, Action::View),
        Err(AccessError::NotVisible)
    );
}

#[rstest]
#[case(AccessRole::Viewer, Action::View, true)]
#[case(AccessRole::Viewer, Action::Contribute, false)]
#[case(AccessRole::Contributor, Action::Contribute, true)]
#[case(AccessRole::Contributor, Action::Edit, false)]
#[case(AccessRole::Editor, Action::Edit, true)]
#[case(AccessRole::Editor, Action::ManageMembers, false)]
#[case(AccessRole::Editor, Action::Delete, false)]
#[case(AccessRole::Owner, Action::ManageMembers, true)]
#[case(AccessRole::Owner, Action::Delete, true)]
fn project_policy_matrix(#[case] role: AccessRole, #[case] action: Action, #[case] allowed: bool) {
    assert_eq!(PROJECT_POLICY.allows(role, action), allowed);
}

#[rstest]
fn idea_editors_may_manage_members_but_not_delete() {
    assert!(IDEA_POLICY.allows(AccessRole::Editor, Action::ManageMembers));
    assert_eq!(
        IDEA_POLICY.authorize(Some(AccessRole::Editor), Action::Delete),
        Err(AccessError::Forbidden {
            action: Action::Delete,
            required: AccessRole::Owner,
        })
    );
}

#[rstest]
fn permissions_expand_the_matrix_for_a_role() {
    let permissions = IDEA_POLICY.permissions(AccessRole::Contributor);

    assert!(permissions.can_view);
    assert!(permissions.can_contribute);
    assert!(!permissions.can_edit);
    assert!(!permissions.can_manage_members);
    assert!(!permissions.can_delete);
}

#[rstest]
fn authorize_returns_the_held_role() {
    assert_eq!(
        PROJECT_POLICY.authorize(Some(AccessRole::Editor), Action::Contribute),
        Ok(AccessRole::Editor)
    );
}

#[rstest]
#[case(AccessRole::Contributor, false)]
#[case(AccessRole::Editor, true)]
#[case(AccessRole::Owner, true)]
fn task_deletion_needs_an_editor(#[case] role: AccessRole, #[case] allowed: bool) {
    assert_eq!(TASK_POLICY.allows(role, Action::Delete), allowed);
    assert!(TASK_POLICY.allows(role, Action::Contribute));
}
