// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

const DEFAULT_BRAIN_URL: &str = "http://127.0.0.1:8080";

pub fn brain_url() -> String {
    std::env::var("BRAIN_URL").unwrap_or_else(|_| DEFAULT_BRAIN_URL.to_string())
}
