// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! `karid`: the root-privileged system agent (spec §4). Binds a Unix socket
//! the Brain connects to, verifies every connection's peer UID, and carries
//! out the host mutations the Brain itself has no privilege to perform.

mod dispatch;
mod env;
mod listener;
mod naming;
mod telemetry;

use std::sync::Arc;

use dispatch::{Dispatcher, DispatcherConfig};
use listener::ListenCtx;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let Some(expected_brain_uid) = env::expected_brain_uid() else {
        tracing::error!("EXPECTED_BRAIN_UID is not set; refusing to bind the agent socket");
        std::process::exit(1);
    };
    let Ok(expected_brain_uid) = u32::try_from(expected_brain_uid) else {
        tracing::error!(uid = expected_brain_uid, "EXPECTED_BRAIN_UID is not a valid uid");
        std::process::exit(1);
    };

    let config = DispatcherConfig {
        cert_root: env::cert_root(),
        web_root: env::web_root(),
        web_user: env::web_user(),
        web_group: env::web_group(),
        services_root: env::services_root(),
        app_root: env::app_root(),
        proxy_config_root: env::proxy_config_root(),
        proxy_syntax_check_program: env::proxy_syntax_check_program(),
        proxy_syntax_check_args: env::proxy_syntax_check_args(),
        service_manager: env::service_manager(),
        proxy_unit_name: env::proxy_unit_name(),
        releases_per_app_keep: env::releases_per_app_keep(),
        firewall_program: env::firewall_program(),
    };
    let dispatcher = Dispatcher::new(config);

    let socket_path = env::socket_path();
    let listener = match listener::bind(&socket_path, env::brain_group().as_deref()).await {
        Ok(listener) => listener,
        Err(e) => {
            tracing::error!(error = %e, path = %socket_path.display(), "failed to bind agent socket");
            std::process::exit(1);
        }
    };

    tracing::info!(path = %socket_path.display(), expected_brain_uid, "agent listening");
    let ctx = Arc::new(ListenCtx { dispatcher, expected_brain_uid });
    listener::run(listener, ctx).await;
}
