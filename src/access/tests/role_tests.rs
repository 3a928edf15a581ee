//! Role parsing, ordering and resolution tests.

use crate::access::{AccessRole, MemberRole};
use rstest::rstest;

#[rstest]
#[case("viewer", MemberRole::Viewer)]
#[case(" Contributor ", MemberRole::Contributor)]
#[case("EDITOR", MemberRole::Editor)]
fn member_role_parses_case_insensitively(#[case] raw: &str, #[case] expected: MemberRole) {
    assert_eq!(MemberRole::try_from(raw), Ok(expected));
}

#[rstest]
fn owner_is_not_an_assignable_member_role() {
    assert!(MemberRole::try_from("owner").is_err());
}

#[rstest]
fn roles_are_totally_ordered_by_rank() {
    assert!(AccessRole::Viewer < AccessRole::Contributor);
    assert!(AccessRole::Contributor < AccessRole::Editor);
    assert!(AccessRole::Editor < AccessRole::Owner);
    assert!(AccessRole::Owner.satisfies(AccessRole::Viewer));
    assert!(!AccessRole::Viewer.satisfies(AccessRole::Contributor));
}

#[rstest]
#[case(true, None, Some(AccessRole::Owner))]
#[case(true, Some(MemberRole::Viewer), Some(AccessRole::Owner))]
#[case(false, Some(MemberRole::Editor), Some(AccessRole::Editor))]
#[case(false, None, None)]
fn resolve_prefers_ownership_over_membership(
    #[case] is_owner: bool,
    #[case] membership: Option<MemberRole>,
    #[case] expected: Option<AccessRole>,
) {
    assert_eq!(AccessRole::resolve(is_owner, membership), expected);
}

#[rstest]
fn strongest_picks_the_higher_role() {
    assert_eq!(
        AccessRole::strongest(Some(AccessRole::Viewer), Some(AccessRole::Editor)),
        Some(AccessRole::Editor)
    );
    assert_eq!(
        AccessRole::strongest(None, Some(AccessRole::Contributor)),
        Some(AccessRole::Contributor)
    );
    assert_eq!(AccessRole::strongest(None, None), None);
}
