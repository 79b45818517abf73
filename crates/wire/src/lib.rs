// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Wire protocol for the Brain ↔ agent RPC transport (spec §4.1).
//!
//! Wire format: 4-byte length prefix (big-endian) + JSON payload. One
//! request per connection for unary RPCs; `StreamDeployment` keeps the
//! connection open and sends a sequence of `LogChunk` frames instead of a
//! single `Response`.

mod framing;
mod request;
mod response;

pub use framing::{
    read_log_chunk, read_request, read_response, write_log_chunk, write_request, write_response,
    ProtocolError,
};
pub use request::{Request, SiteAction};
pub use response::Response;
