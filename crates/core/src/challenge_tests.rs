// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

#[test]
fn plain_token_is_accepted() {
    assert!(ChallengeIntent::validate_token("abcDEF123_-").is_ok());
}

#[yare::parameterized(
    path_traversal = { "../../../etc/passwd" },
    slash = { "foo/bar" },
    dotdot_only = { ".." },
    empty = { "" },
    space = { "has space" },
    dollar = { "evil$(rm)" },
)]
fn illegal_tokens_are_rejected(token: &str) {
    let err = ChallengeIntent::validate_token(token).unwrap_err();
    assert_eq!(err.code(), "validation");
}

#[test]
fn relative_path_is_scoped_to_well_known() {
    let intent = ChallengeIntent {
        action: ChallengeAction::Present,
        domain: "example.com".into(),
        token: "tok123".into(),
        key_authorization: "resp".into(),
    };
    assert_eq!(intent.relative_path(), ".well-known/acme-challenge/tok123");
}

proptest::proptest! {
    #[test]
    fn any_token_with_forward_slash_is_rejected(prefix in "[A-Za-z0-9]{0,8}", suffix in "[A-Za-z0-9]{0,8}") {
        let token = format!("{prefix}/{suffix}");
        proptest::prop_assert!(ChallengeIntent::validate_token(&token).is_err());
    }

    #[test]
    fn any_alnum_underscore_dash_token_is_accepted(token in "[A-Za-z0-9_-]{1,64}") {
        proptest::prop_assert!(ChallengeIntent::validate_token(&token).is_ok());
    }
}
