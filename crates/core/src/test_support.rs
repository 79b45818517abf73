// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Test builders and proptest strategies shared by other crates' test suites.
//! Only compiled under `test` or the `test-support` feature.

use crate::{Deployment, DeploymentStatus, Site};

/// A site that passes validation, for tests that only care about downstream
/// behaviour.
pub fn valid_site() -> Site {
    Site::new("site-1", "example.com", None, None, 1001)
}

pub fn pending_deployment(id: &str, site_id: &str) -> Deployment {
    Deployment::new_pending(id, site_id, 0)
}

#[cfg(feature = "proptest")]
pub fn arb_deployment_status() -> impl proptest::strategy::Strategy<Value = DeploymentStatus> {
    use proptest::prelude::*;
    prop_oneof![
        Just(DeploymentStatus::Pending),
        Just(DeploymentStatus::Running),
        Just(DeploymentStatus::Success),
        Just(DeploymentStatus::Failed),
    ]
}
