// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;

fn valid() -> Site {
    Site::new("site-1", "example.com", None, None, 1001)
}

#[test]
fn valid_site_passes() {
    assert!(valid().validate().is_ok());
}

#[test]
fn blank_id_rejected() {
    let mut s = valid();
    s.id = "   ".to_string();
    assert_eq!(s.validate(), Err(SiteValidationError::BlankId));
}

#[test]
fn blank_domain_rejected() {
    let mut s = valid();
    s.domain = String::new();
    assert_eq!(s.validate(), Err(SiteValidationError::BlankDomain));
}

#[yare::parameterized(
    zero = { 0 },
    negative = { -1 },
)]
fn non_positive_owner_uid_rejected(uid: i64) {
    let mut s = valid();
    s.owner_uid = uid;
    assert_eq!(s.validate(), Err(SiteValidationError::NonPositiveOwnerUid(uid)));
}
