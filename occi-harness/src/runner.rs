//! Session setup and scenario dispatch.

use occi_harness_client::{
    CredentialSource, KeystoneV2, OcciClient, Session, StaticToken,
};
use tracing::{Instrument, error, info, info_span, warn};

use crate::config::HarnessConfig;
use crate::error::Result;
use crate::lifecycle::Lifecycle;
use crate::report::{Report, ScenarioOutcome, Status};
use crate::scenario::Scenario;

/// An authenticated client ready to run scenarios.
pub struct Harness {
    client: OcciClient,
    session: Session,
    config: HarnessConfig,
}

impl Harness {
    /// Build the client and acquire a credential.
    ///
    /// A configured token is used as-is; otherwise the identity service is
    /// asked for one.
    pub async fn connect(config: HarnessConfig) -> Result<Self> {
        let client = build_client(&config)?;
        let credential = match &config.token {
            Some(token) => StaticToken::new(token.clone()).acquire().await?,
            None => {
                KeystoneV2::new(
                    config.identity_endpoint.clone(),
                    config.username.clone(),
                    config.password.clone(),
                )
                .with_transport(client.transport().clone())
                .acquire()
                .await?
            }
        };
        Ok(Self::with_session(
            client,
            Session::new(credential, config.service_endpoint.clone()),
            config,
        ))
    }

    /// Build the client and acquire a credential from `source`.
    pub async fn connect_with<S: CredentialSource>(config: HarnessConfig, source: &S) -> Result<Self> {
        let client = build_client(&config)?;
        let credential = source.acquire().await?;
        Ok(Self::with_session(
            client,
            Session::new(credential, config.service_endpoint.clone()),
            config,
        ))
    }

    pub fn with_session(client: OcciClient, session: Session, config: HarnessConfig) -> Self {
        Self {
            client,
            session,
            config,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Run `scenarios` in order.
    ///
    /// A fatal error stops the run: the failing scenario is reported as
    /// aborted and the remaining ones as skipped.
    pub async fn run(&self, scenarios: &[Scenario]) -> Report {
        let mut report = Report::new();
        let mut aborted = false;

        for &scenario in scenarios {
            if aborted {
                report.push(ScenarioOutcome {
                    scenario,
                    status: Status::Skipped,
                    advisory_failures: 0,
                });
                continue;
            }

            let mut lc = Lifecycle::new(
                &self.client,
                &self.session,
                self.config.wait.clone(),
                self.config.assertions,
            );
            let span = info_span!("scenario", name = scenario.name());
            let result = scenario.run(&mut lc).instrument(span).await;

            let status = match result {
                Ok(()) => {
                    info!(scenario = scenario.name(), "passed");
                    Status::Passed
                }
                Err(e) if e.is_fatal() => {
                    error!(scenario = scenario.name(), error = %e, "aborting run");
                    aborted = true;
                    Status::Aborted(e.to_string())
                }
                Err(e) => {
                    warn!(scenario = scenario.name(), error = %e, "failed");
                    Status::Failed(e.to_string())
                }
            };
            report.push(ScenarioOutcome {
                scenario,
                status,
                advisory_failures: lc.advisory_failures(),
            });
        }

        report
    }
}

fn build_client(config: &HarnessConfig) -> Result<OcciClient> {
    let mut builder = OcciClient::builder();
    if let Some(timeout) = config.request_timeout {
        builder = builder.request_timeout(timeout);
    }
    Ok(builder.build()?)
}
