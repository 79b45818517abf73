// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! RPC dispatch: the translation from a wire `Request` into calls against
//! `kari-jail`, `kari-certstore`, and `kari-exec` (spec §4.1–§4.3).

use std::path::{Path, PathBuf};

use kari_certstore::DomainLocks;
use kari_core::{
    AgentError, CertificateMaterial, ChallengeAction, ChallengeIntent, Clock, LogChunk, LogLevel,
    ReleaseName, SystemClock,
};
use kari_exec::{Argv, RunAs};
use kari_jail::{ServiceUnitSpec, TlsPaths, VhostSpec};
use kari_wire::{Request, Response, SiteAction};
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

use crate::naming;
use crate::telemetry;

const LOG_CHANNEL_CAPACITY: usize = 100;

/// Static configuration a [`Dispatcher`] is built from, resolved once at
/// startup from the `env` module.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    pub cert_root: PathBuf,
    pub web_root: PathBuf,
    pub web_user: String,
    pub web_group: String,
    pub services_root: PathBuf,
    pub app_root: PathBuf,
    pub proxy_config_root: PathBuf,
    pub proxy_syntax_check_program: String,
    pub proxy_syntax_check_args: Vec<String>,
    pub service_manager: String,
    pub proxy_unit_name: String,
    pub releases_per_app_keep: usize,
    pub firewall_program: String,
}

/// Everything the RPC layer needs to turn a `Request` into a host mutation.
/// Cheap to clone: every field is either owned configuration or an `Arc`.
#[derive(Clone)]
pub struct Dispatcher<C: Clock = SystemClock> {
    config: DispatcherConfig,
    domain_locks: DomainLocks,
    clock: C,
}

impl Dispatcher<SystemClock> {
    pub fn new(config: DispatcherConfig) -> Self {
        Self { config, domain_locks: DomainLocks::new(), clock: SystemClock }
    }
}

impl<C: Clock> Dispatcher<C> {
    pub fn with_clock(config: DispatcherConfig, clock: C) -> Self {
        Self { config, domain_locks: DomainLocks::new(), clock }
    }

    /// Dispatches every request except `StreamDeployment`, which upgrades
    /// the connection instead of returning a single `Response`.
    pub async fn handle_unary(&self, request: Request) -> Response {
        match request {
            Request::RunSystemCheck { server_id: _ } => {
                let report =
                    telemetry::run_system_check(&self.config.service_manager, &self.config.firewall_program).await;
                Response::SystemCheck { report }
            }
            Request::ActivateSite { site_id, domain, ipv4: _, ipv6: _, owner_uid, action } => {
                activation_result(self.activate_site(&site_id, &domain, owner_uid, action).await)
            }
            Request::PresentChallenge { domain, token, key_auth } => {
                let intent =
                    ChallengeIntent { action: ChallengeAction::Present, domain, token, key_authorization: key_auth };
                ack(kari_certstore::present_challenge(&self.config.web_root, &self.config.web_user, &self.config.web_group, &intent).await)
            }
            Request::CleanupChallenge { domain, token } => {
                let intent = ChallengeIntent {
                    action: ChallengeAction::Cleanup,
                    domain,
                    token,
                    key_authorization: String::new(),
                };
                ack(kari_certstore::cleanup_challenge(&self.config.web_root, &intent).await)
            }
            Request::InstallCertificate { domain, fullchain_pem, privkey_pem } => {
                let mut material = CertificateMaterial::new(domain, fullchain_pem, privkey_pem);
                ack(kari_certstore::install(&self.config.cert_root, &self.domain_locks, &mut material).await)
            }
            Request::GetSystemStatus => match telemetry::get_system_status(&self.config.services_root).await {
                Ok(status) => Response::SystemStatus {
                    distro: status.distro,
                    cpu_percent: status.cpu_percent,
                    rss_bytes: status.rss_bytes,
                    active_jail_count: status.active_jail_count,
                },
                Err(e) => Response::from_agent_error(&e),
            },
            Request::StreamDeployment { .. } => {
                Response::from_agent_error(&AgentError::Internal("StreamDeployment must use handle_stream".into()))
            }
        }
    }

    async fn activate_site(
        &self,
        site_id: &str,
        domain: &str,
        owner_uid: i64,
        action: SiteAction,
    ) -> Result<(), AgentError> {
        match action {
            SiteAction::CreateSystemUser => {
                kari_jail::ensure_system_user(&naming::system_username(site_id), owner_uid).await
            }
            SiteAction::ApplyHttpVhost => {
                let spec = VhostSpec {
                    domain: domain.to_string(),
                    upstream_port: naming::upstream_port(site_id),
                    tls: None,
                };
                self.apply_and_reload(&spec).await
            }
            SiteAction::ApplyHttpsVhost => {
                let cert_dir = kari_certstore::domain_dir(&self.config.cert_root, domain);
                let spec = VhostSpec {
                    domain: domain.to_string(),
                    upstream_port: naming::upstream_port(site_id),
                    tls: Some(TlsPaths {
                        fullchain: cert_dir.join("fullchain.pem"),
                        privkey: cert_dir.join("privkey.pem"),
                    }),
                };
                self.apply_and_reload(&spec).await
            }
        }
    }

    async fn apply_and_reload(&self, spec: &VhostSpec) -> Result<(), AgentError> {
        kari_jail::apply_vhost(
            &self.config.proxy_config_root,
            spec,
            &self.config.proxy_syntax_check_program,
            &self.config.proxy_syntax_check_args,
        )
        .await?;
        kari_jail::reload_proxy(&self.config.service_manager, &self.config.proxy_unit_name).await
    }

    async fn chown(&self, path: &Path, uid: u32, gid: u32) -> Result<(), AgentError> {
        let owner = format!("{uid}:{gid}");
        kari_exec::run_checked(&Argv::new("chown").arg(&owner).arg(path.to_string_lossy().into_owned()), &RunAs::default())
            .await
            .map(|_| ())
            .map_err(AgentError::from)
    }
}

impl<C: Clock + 'static> Dispatcher<C> {
    /// Runs a `StreamDeployment` RPC: clones the repository, builds it as
    /// the application's unprivileged user, activates the new release,
    /// installs and starts its service unit, then prunes old releases
    /// (spec §4.2 step 1 precursor, §4.3.2, §4.3.3). Log chunks are pushed
    /// to `writer` as they are produced; reading zero bytes from `reader`
    /// (the Brain closing its side) cancels the in-flight build (spec §5).
    pub async fn handle_stream<R, W>(&self, request: Request, mut reader: R, mut writer: W)
    where
        R: AsyncRead + Unpin,
        W: AsyncWrite + Unpin,
    {
        let Request::StreamDeployment { trace_id, app_id, repo_url, branch, build_command, port, ssh_key } = request
        else {
            return;
        };

        let cancel = CancellationToken::new();
        let (tx, mut rx) = mpsc::channel::<LogChunk>(LOG_CHANNEL_CAPACITY);

        let dispatcher = self.clone();
        let job_cancel = cancel.clone();
        let job_trace_id = trace_id.clone();
        let job = tokio::spawn(async move {
            dispatcher
                .run_deployment(&job_trace_id, &app_id, &repo_url, &branch, &build_command, port, ssh_key.as_deref(), &tx, job_cancel)
                .await
        });

        let mut disconnect_buf = [0u8; 1];
        loop {
            tokio::select! {
                biased;
                maybe_chunk = rx.recv() => {
                    match maybe_chunk {
                        Some(chunk) => {
                            let is_eof = chunk.is_eof;
                            if kari_wire::write_log_chunk(&mut writer, &chunk).await.is_err() {
                                cancel.cancel();
                                break;
                            }
                            if is_eof {
                                break;
                            }
                        }
                        None => break,
                    }
                }
                n = reader.read(&mut disconnect_buf) => {
                    if matches!(n, Ok(0) | Err(_)) {
                        cancel.cancel();
                    }
                }
            }
        }
        let _ = job.await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_deployment(
        &self,
        trace_id: &str,
        app_id: &str,
        repo_url: &str,
        branch: &str,
        build_command: &[String],
        port: u16,
        ssh_key: Option<&str>,
        tx: &mpsc::Sender<LogChunk>,
        cancel: CancellationToken,
    ) {
        if let Err(e) =
            self.run_deployment_inner(trace_id, app_id, repo_url, branch, build_command, port, ssh_key, tx, cancel).await
        {
            send_system_line(tx, trace_id, format!("deployment failed: {}", e.public_message())).await;
        }
        let _ = tx.send(LogChunk::eof(trace_id)).await;
    }

    #[allow(clippy::too_many_arguments)]
    async fn run_deployment_inner(
        &self,
        trace_id: &str,
        app_id: &str,
        repo_url: &str,
        branch: &str,
        build_command: &[String],
        port: u16,
        ssh_key: Option<&str>,
        tx: &mpsc::Sender<LogChunk>,
        cancel: CancellationToken,
    ) -> Result<(), AgentError> {
        let username = naming::system_username(app_id);
        let (uid, gid) = kari_exec::resolve_user(&username)
            .map_err(|e| AgentError::Precondition(format!("resolve user {username}: {e}")))?;

        let app_dir = self.config.app_root.join(app_id);
        let release = ReleaseName::from_epoch_ms(self.clock.epoch_ms());
        let release_path = kari_jail::release_dir(&app_dir, release);

        kari_exec::create_dir_with_mode(&release_path, 0o750)
            .await
            .map_err(|e| AgentError::Internal(format!("create release dir: {e}")))?;
        self.chown(&release_path, uid, gid).await?;

        let mut envs = Vec::new();
        if let Some(key) = ssh_key {
            envs.push(("KARI_DEPLOY_SSH_KEY".to_string(), key.to_string()));
        }
        let clone_run_as = RunAs { cwd: None, envs, uid: Some(uid), gid: Some(gid) };

        send_system_line(tx, trace_id, format!("cloning {repo_url} ({branch})")).await;
        let clone_argv = Argv::new("git").args([
            "clone".to_string(),
            "--branch".to_string(),
            branch.to_string(),
            "--depth".to_string(),
            "1".to_string(),
            repo_url.to_string(),
            release_path.to_string_lossy().into_owned(),
        ]);
        kari_exec::run_checked(&clone_argv, &clone_run_as).await.map_err(AgentError::from)?;

        if let Some((program, args)) = build_command.split_first() {
            send_system_line(tx, trace_id, "building").await;
            let build_argv = Argv::new(program).args(args.to_vec());
            let build_run_as = RunAs { cwd: Some(release_path.clone()), envs: Vec::new(), uid: Some(uid), gid: Some(gid) };
            self.stream_build(&build_argv, &build_run_as, trace_id, tx, cancel).await?;
        }

        kari_jail::activate_release(&app_dir, release).await?;

        let unit_spec = ServiceUnitSpec {
            app_id: app_id.to_string(),
            username: username.clone(),
            app_dir: app_dir.clone(),
            exec_start: app_dir.join("current").join("bin/start").to_string_lossy().into_owned(),
            port,
        };
        kari_jail::install_unit(&self.config.services_root, &unit_spec).await?;

        let unit_name = format!("kari-{app_id}.service");
        kari_exec::run_checked(&Argv::new(&self.config.service_manager).args(["enable", "--now", &unit_name]), &RunAs::default())
            .await
            .map_err(AgentError::from)?;

        let deleted = kari_jail::prune(&app_dir, self.config.releases_per_app_keep).await?;
        if !deleted.is_empty() {
            send_system_line(tx, trace_id, format!("pruned {} old release(s)", deleted.len())).await;
        }

        Ok(())
    }

    async fn stream_build(
        &self,
        argv: &Argv,
        run_as: &RunAs,
        trace_id: &str,
        tx: &mpsc::Sender<LogChunk>,
        cancel: CancellationToken,
    ) -> Result<(), AgentError> {
        let (inner_tx, mut inner_rx) = mpsc::channel::<LogChunk>(LOG_CHANNEL_CAPACITY);
        let forward = async {
            while let Some(chunk) = inner_rx.recv().await {
                if chunk.is_eof {
                    break;
                }
                if tx.send(chunk).await.is_err() {
                    break;
                }
            }
        };

        let (result, ()) = tokio::join!(kari_exec::spawn_streaming(argv, run_as, trace_id, inner_tx, cancel), forward);
        let output = result.map_err(AgentError::from)?;
        if !output.success() {
            return Err(AgentError::ExecutionFailed { exit_code: output.exit_code, stderr_tail: String::new() });
        }
        Ok(())
    }
}

async fn send_system_line(tx: &mpsc::Sender<LogChunk>, trace_id: &str, message: impl Into<String>) {
    let _ = tx.send(LogChunk::line(trace_id, LogLevel::System, message.into().into_bytes())).await;
}

fn ack(result: Result<(), AgentError>) -> Response {
    match result {
        Ok(()) => Response::Ok,
        Err(e) => Response::from_agent_error(&e),
    }
}

fn activation_result(result: Result<(), AgentError>) -> Response {
    match result {
        Ok(()) => Response::ActivationResult { ok: true },
        Err(e) => Response::from_agent_error(&e),
    }
}

#[cfg(test)]
#[path = "dispatch_tests.rs"]
mod tests;
