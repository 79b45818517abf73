// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The Brain's view of the agent (spec §4.1). [`LocalSocketAgent`] is the
//! real transport; [`FakeAgent`] (under `test-support`) is an in-process
//! stand-in selected by `AGENT_TRANSPORT=inmemory` for development and
//! tests that don't want a live socket and root access.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use kari_core::{AgentError, LogChunk, SystemCheckReport};
use kari_wire::{Request, Response, SiteAction};
use tokio::net::UnixStream;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

const DEFAULT_RPC_TIMEOUT: Duration = Duration::from_secs(60);
const LOG_CHANNEL_CAPACITY: usize = 100;

#[derive(Debug, Clone, Copy, Default)]
pub struct SystemStatus {
    pub cpu_percent: f32,
    pub rss_bytes: u64,
    pub active_jail_count: u32,
}

/// Everything the Brain needs from the agent, independent of transport.
/// `stream_deployment` returns a receiver of [`LogChunk`]s plus a token the
/// caller cancels to stop the upstream RPC — exactly the shape the fan-out
/// hub in `kari-pipeline` needs (spec §4.4).
#[async_trait]
pub trait Agent: Send + Sync {
    async fn run_system_check(&self, server_id: &str) -> Result<SystemCheckReport, AgentError>;

    #[allow(clippy::too_many_arguments)]
    async fn activate_site(
        &self,
        site_id: &str,
        domain: &str,
        ipv4: Option<String>,
        ipv6: Option<String>,
        owner_uid: i64,
        action: SiteAction,
    ) -> Result<(), AgentError>;

    async fn present_challenge(&self, domain: &str, token: &str, key_auth: &str) -> Result<(), AgentError>;
    async fn cleanup_challenge(&self, domain: &str, token: &str) -> Result<(), AgentError>;
    async fn install_certificate(
        &self,
        domain: &str,
        fullchain_pem: Vec<u8>,
        privkey_pem: Vec<u8>,
    ) -> Result<(), AgentError>;

    #[allow(clippy::too_many_arguments)]
    async fn stream_deployment(
        &self,
        trace_id: &str,
        app_id: &str,
        repo_url: &str,
        branch: &str,
        build_command: Vec<String>,
        port: u16,
        ssh_key: Option<String>,
    ) -> Result<(mpsc::Receiver<LogChunk>, CancellationToken), AgentError>;

    async fn get_system_status(&self) -> Result<SystemStatus, AgentError>;
}

/// Real transport: a length-prefixed JSON RPC over the agent's local
/// socket (spec §4.1). A fresh connection is opened per call; unary RPCs
/// are cheap enough on a local socket that connection pooling buys nothing
/// the OS doesn't already give for free.
pub struct LocalSocketAgent {
    socket_path: PathBuf,
    timeout: Duration,
}

impl LocalSocketAgent {
    pub fn new(socket_path: impl Into<PathBuf>) -> Self {
        Self { socket_path: socket_path.into(), timeout: DEFAULT_RPC_TIMEOUT }
    }

    async fn call(&self, request: Request) -> Result<Response, AgentError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| AgentError::Transient(format!("connect to agent: {e}")))?;
        kari_wire::write_request(&mut stream, &request, self.timeout)
            .await
            .map_err(|e| AgentError::Transient(format!("send request to agent: {e}")))?;
        kari_wire::read_response(&mut stream, self.timeout)
            .await
            .map_err(|e| AgentError::Transient(format!("read response from agent: {e}")))
    }

    fn unwrap_ok(response: Response) -> Result<(), AgentError> {
        match response {
            Response::Ok | Response::ActivationResult { ok: true } => Ok(()),
            Response::ActivationResult { ok: false } => {
                Err(AgentError::Internal("agent reported activation step failed".into()))
            }
            Response::Error { code, message } => Err(error_from_wire(&code, message)),
            other => Err(AgentError::Internal(format!("unexpected agent response: {other:?}"))),
        }
    }
}

fn error_from_wire(code: &str, message: String) -> AgentError {
    match code {
        "validation" => AgentError::Validation(message),
        "unauthorized" => AgentError::Unauthorized,
        "precondition" => AgentError::Precondition(message),
        "integrity" => AgentError::Integrity(message),
        "transient" => AgentError::Transient(message),
        "execution_failed" => AgentError::ExecutionFailed { exit_code: -1, stderr_tail: message },
        _ => AgentError::Internal(message),
    }
}

#[async_trait]
impl Agent for LocalSocketAgent {
    async fn run_system_check(&self, server_id: &str) -> Result<SystemCheckReport, AgentError> {
        match self.call(Request::RunSystemCheck { server_id: server_id.to_string() }).await? {
            Response::SystemCheck { report } => Ok(report),
            Response::Error { code, message } => Err(error_from_wire(&code, message)),
            other => Err(AgentError::Internal(format!("unexpected agent response: {other:?}"))),
        }
    }

    async fn activate_site(
        &self,
        site_id: &str,
        domain: &str,
        ipv4: Option<String>,
        ipv6: Option<String>,
        owner_uid: i64,
        action: SiteAction,
    ) -> Result<(), AgentError> {
        let response = self
            .call(Request::ActivateSite {
                site_id: site_id.to_string(),
                domain: domain.to_string(),
                ipv4,
                ipv6,
                owner_uid,
                action,
            })
            .await?;
        Self::unwrap_ok(response)
    }

    async fn present_challenge(&self, domain: &str, token: &str, key_auth: &str) -> Result<(), AgentError> {
        let response = self
            .call(Request::PresentChallenge {
                domain: domain.to_string(),
                token: token.to_string(),
                key_auth: key_auth.to_string(),
            })
            .await?;
        Self::unwrap_ok(response)
    }

    async fn cleanup_challenge(&self, domain: &str, token: &str) -> Result<(), AgentError> {
        let response = self
            .call(Request::CleanupChallenge { domain: domain.to_string(), token: token.to_string() })
            .await?;
        Self::unwrap_ok(response)
    }

    async fn install_certificate(
        &self,
        domain: &str,
        fullchain_pem: Vec<u8>,
        privkey_pem: Vec<u8>,
    ) -> Result<(), AgentError> {
        let response = self
            .call(Request::InstallCertificate { domain: domain.to_string(), fullchain_pem, privkey_pem })
            .await?;
        Self::unwrap_ok(response)
    }

    async fn stream_deployment(
        &self,
        trace_id: &str,
        app_id: &str,
        repo_url: &str,
        branch: &str,
        build_command: Vec<String>,
        port: u16,
        ssh_key: Option<String>,
    ) -> Result<(mpsc::Receiver<LogChunk>, CancellationToken), AgentError> {
        let mut stream = UnixStream::connect(&self.socket_path)
            .await
            .map_err(|e| AgentError::Transient(format!("connect to agent: {e}")))?;
        let request = Request::StreamDeployment {
            trace_id: trace_id.to_string(),
            app_id: app_id.to_string(),
            repo_url: repo_url.to_string(),
            branch: branch.to_string(),
            build_command,
            port,
            ssh_key,
        };
        kari_wire::write_request(&mut stream, &request, self.timeout)
            .await
            .map_err(|e| AgentError::Transient(format!("send stream request to agent: {e}")))?;

        let (tx, rx) = mpsc::channel(LOG_CHANNEL_CAPACITY);
        let cancel = CancellationToken::new();
        let task_cancel = cancel.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = task_cancel.cancelled() => break,
                    chunk = kari_wire::read_log_chunk(&mut stream) => {
                        match chunk {
                            Ok(chunk) => {
                                let is_eof = chunk.is_eof;
                                if tx.send(chunk).await.is_err() || is_eof {
                                    break;
                                }
                            }
                            Err(_) => break,
                        }
                    }
                }
            }
        });
        Ok((rx, cancel))
    }

    async fn get_system_status(&self) -> Result<SystemStatus, AgentError> {
        match self.call(Request::GetSystemStatus).await? {
            Response::SystemStatus { cpu_percent, rss_bytes, active_jail_count, .. } => {
                Ok(SystemStatus { cpu_percent, rss_bytes, active_jail_count })
            }
            Response::Error { code, message } => Err(error_from_wire(&code, message)),
            other => Err(AgentError::Internal(format!("unexpected agent response: {other:?}"))),
        }
    }
}

/// Selects the transport named by `AGENT_TRANSPORT` (spec §6). The literal
/// values are `grpc` (the real local-socket client; named for historical
/// compatibility with an earlier transport choice, not because it speaks
/// gRPC) and `inmemory` (development/test fake).
pub fn from_env() -> Result<std::sync::Arc<dyn Agent>, AgentError> {
    let transport = std::env::var("AGENT_TRANSPORT").unwrap_or_else(|_| "grpc".to_string());
    match transport.as_str() {
        "grpc" => {
            let address = std::env::var("AGENT_ADDRESS")
                .map_err(|_| AgentError::Internal("AGENT_ADDRESS is required for AGENT_TRANSPORT=grpc".into()))?;
            Ok(std::sync::Arc::new(LocalSocketAgent::new(address)))
        }
        #[cfg(any(test, feature = "test-support"))]
        "inmemory" => Ok(std::sync::Arc::new(fake::FakeAgent::default())),
        other => Err(AgentError::Internal(format!("unknown AGENT_TRANSPORT: {other}"))),
    }
}

#[cfg(any(test, feature = "test-support"))]
mod fake {
    use std::sync::Arc;

    use async_trait::async_trait;
    use kari_core::{AgentError, LogChunk, LogLevel, SystemCheckReport};
    use kari_wire::SiteAction;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;
    use tokio_util::sync::CancellationToken;

    use super::{Agent, SystemStatus};

    /// One recorded call, for assertions in pipeline/brain tests that need
    /// to check ordering (e.g. that `activate_site` is invoked with the
    /// three `SiteAction`s in sequence).
    #[derive(Debug, Clone, PartialEq)]
    pub enum FakeCall {
        RunSystemCheck { server_id: String },
        ActivateSite { site_id: String, action: SiteAction },
        PresentChallenge { domain: String, token: String },
        CleanupChallenge { domain: String, token: String },
        InstallCertificate { domain: String },
        StreamDeployment { trace_id: String },
        GetSystemStatus,
    }

    struct FakeState {
        calls: Vec<FakeCall>,
        fail_next: Option<AgentError>,
        system_check_report: SystemCheckReport,
    }

    fn healthy_report() -> SystemCheckReport {
        SystemCheckReport {
            distro: "debian".into(),
            version: "12".into(),
            services: std::collections::HashMap::from([
                ("nginx".to_string(), "active".to_string()),
                ("sshd".to_string(), "active".to_string()),
            ]),
            firewall_type: "ufw".into(),
            firewall_status: "active".into(),
        }
    }

    /// In-process stand-in for the agent, selected by `AGENT_TRANSPORT=inmemory`.
    /// Records every call and always succeeds unless primed with
    /// [`FakeAgent::fail_next`].
    #[derive(Clone)]
    pub struct FakeAgent {
        state: Arc<Mutex<FakeState>>,
    }

    impl Default for FakeAgent {
        fn default() -> Self {
            Self {
                state: Arc::new(Mutex::new(FakeState {
                    calls: Vec::new(),
                    fail_next: None,
                    system_check_report: healthy_report(),
                })),
            }
        }
    }

    impl FakeAgent {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn calls(&self) -> Vec<FakeCall> {
            self.state.lock().calls.clone()
        }

        /// Makes the next call (of any kind) return `err` instead of
        /// succeeding. One-shot: the primed failure is consumed.
        pub fn fail_next(&self, err: AgentError) {
            self.state.lock().fail_next = Some(err);
        }

        /// Overrides the report returned by the next (and all subsequent)
        /// `run_system_check` calls, so callers can exercise the unhealthy
        /// path without standing up a real agent.
        pub fn set_system_check_report(&self, report: SystemCheckReport) {
            self.state.lock().system_check_report = report;
        }

        fn record(&self, call: FakeCall) -> Result<(), AgentError> {
            let mut state = self.state.lock();
            state.calls.push(call);
            match state.fail_next.take() {
                Some(err) => Err(err),
                None => Ok(()),
            }
        }
    }

    #[async_trait]
    impl Agent for FakeAgent {
        async fn run_system_check(&self, server_id: &str) -> Result<SystemCheckReport, AgentError> {
            self.record(FakeCall::RunSystemCheck { server_id: server_id.to_string() })?;
            Ok(self.state.lock().system_check_report.clone())
        }

        async fn activate_site(
            &self,
            site_id: &str,
            _domain: &str,
            _ipv4: Option<String>,
            _ipv6: Option<String>,
            _owner_uid: i64,
            action: SiteAction,
        ) -> Result<(), AgentError> {
            self.record(FakeCall::ActivateSite { site_id: site_id.to_string(), action })
        }

        async fn present_challenge(&self, domain: &str, token: &str, _key_auth: &str) -> Result<(), AgentError> {
            self.record(FakeCall::PresentChallenge { domain: domain.to_string(), token: token.to_string() })
        }

        async fn cleanup_challenge(&self, domain: &str, token: &str) -> Result<(), AgentError> {
            self.record(FakeCall::CleanupChallenge { domain: domain.to_string(), token: token.to_string() })
        }

        async fn install_certificate(
            &self,
            domain: &str,
            _fullchain_pem: Vec<u8>,
            _privkey_pem: Vec<u8>,
        ) -> Result<(), AgentError> {
            self.record(FakeCall::InstallCertificate { domain: domain.to_string() })
        }

        async fn stream_deployment(
            &self,
            trace_id: &str,
            _app_id: &str,
            _repo_url: &str,
            _branch: &str,
            _build_command: Vec<String>,
            _port: u16,
            _ssh_key: Option<String>,
        ) -> Result<(mpsc::Receiver<LogChunk>, CancellationToken), AgentError> {
            self.record(FakeCall::StreamDeployment { trace_id: trace_id.to_string() })?;
            let (tx, rx) = mpsc::channel(8);
            let trace_id = trace_id.to_string();
            tokio::spawn(async move {
                let _ = tx
                    .send(LogChunk::line(&trace_id, LogLevel::System, b"fake deployment log line".to_vec()))
                    .await;
                let _ = tx.send(LogChunk::eof(&trace_id)).await;
            });
            Ok((rx, CancellationToken::new()))
        }

        async fn get_system_status(&self) -> Result<SystemStatus, AgentError> {
            self.record(FakeCall::GetSystemStatus)?;
            Ok(SystemStatus { cpu_percent: 1.0, rss_bytes: 1_000_000, active_jail_count: 0 })
        }
    }
}

#[cfg(any(test, feature = "test-support"))]
pub use fake::{FakeAgent, FakeCall};

#[cfg(test)]
#[path = "agent_tests.rs"]
mod tests;
