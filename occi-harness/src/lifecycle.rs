//! Lifecycle orchestration.
//!
//! A [`Lifecycle`] sequences dependent operations against one session:
//! create-then-list, wait for a state, act, and always tear down. Waiting
//! follows the configured [`WaitStrategy`]; failed expectations follow the
//! configured [`AssertionPolicy`].
//!
//! Teardown is expressed as a combinator over the scenario body:
//!
//! ```ignore
//! let vm = lc.create_listed(collections::COMPUTE, &template, &[]).await?;
//! let outcome = exercise(lc, &vm).await;
//! lc.teardown(vm, outcome).await
//! ```

use http::Method;
use occi_harness_client::{ClientError, OcciClient, PollError, ResourceHandle, Session, poll_until};
use occi_harness_core::{Action, Attribute, Category, DecodedHeaders};
use tracing::{debug, error, info, warn};

use crate::config::{AssertionPolicy, WaitStrategy};
use crate::error::{HarnessError, Result};
use crate::expect::Expectation;

/// The outcome of one checked expectation.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AssertionRecord {
    pub description: String,
    pub passed: bool,
}

/// Sequencing engine for one scenario.
pub struct Lifecycle<'a> {
    client: &'a OcciClient,
    session: &'a Session,
    wait: WaitStrategy,
    policy: AssertionPolicy,
    records: Vec<AssertionRecord>,
}

impl<'a> Lifecycle<'a> {
    pub fn new(
        client: &'a OcciClient,
        session: &'a Session,
        wait: WaitStrategy,
        policy: AssertionPolicy,
    ) -> Self {
        Self {
            client,
            session,
            wait,
            policy,
            records: Vec::new(),
        }
    }

    pub fn client(&self) -> &'a OcciClient {
        self.client
    }

    pub fn session(&self) -> &'a Session {
        self.session
    }

    pub fn records(&self) -> &[AssertionRecord] {
        &self.records
    }

    /// Failed expectations that did not stop the scenario.
    ///
    /// Under [`AssertionPolicy::Fatal`] every failure became an error, so
    /// none count.
    pub fn advisory_failures(&self) -> usize {
        match self.policy {
            AssertionPolicy::Advisory => self.records.iter().filter(|r| !r.passed).count(),
            AssertionPolicy::Fatal => 0,
        }
    }

    /// Record an expectation.
    ///
    /// A failure is logged at error level. Under [`AssertionPolicy::Fatal`] it
    /// also becomes [`HarnessError::Assertion`].
    pub fn check<F>(&mut self, condition: bool, describe: F) -> Result<()>
    where
        F: FnOnce() -> String,
    {
        let description = describe();
        if condition {
            debug!(assertion = %description, "assertion held");
        } else {
            error!(assertion = %description, policy = %self.policy, "assertion failed");
        }
        self.records.push(AssertionRecord {
            description: description.clone(),
            passed: condition,
        });

        match (condition, self.policy) {
            (false, AssertionPolicy::Fatal) => Err(HarnessError::Assertion(description)),
            _ => Ok(()),
        }
    }

    /// Create a resource and check that the owning collection lists it.
    ///
    /// The listing carries absolute URLs, so the handle is compared in its
    /// absolute form. If the check fails fatally the resource is destroyed
    /// before the error is returned.
    pub async fn create_listed(
        &mut self,
        collection: &str,
        categories: &[Category],
        attributes: &[Attribute],
    ) -> Result<ResourceHandle> {
        let handle = self
            .client
            .create(self.session, collection, categories, attributes)
            .await?;
        info!(resource = %handle, "created");

        let listed = match self.client.list(self.session, collection).await {
            Ok(listed) => listed,
            Err(e) => return self.teardown(handle, Err(e.into())).await,
        };
        let url = self.session.absolute_url(&handle);
        if let Err(e) = self.check(listed.contains(&url), || {
            format!("{} should be listed in {}", url, collection)
        }) {
            return self.teardown(handle, Err(e)).await;
        }
        Ok(handle)
    }

    pub async fn act(&self, handle: &ResourceHandle, action: &Action) -> Result<()> {
        info!(resource = %handle, action = action.name(), "triggering action");
        self.client.invoke_action(self.session, handle, action).await?;
        Ok(())
    }

    /// Wait until a retrieve of `handle` satisfies `expectation`.
    ///
    /// With [`WaitStrategy::Poll`] an unmet expectation after the window is a
    /// [`HarnessError::Timeout`]. With [`WaitStrategy::Fixed`] the expectation
    /// is checked once after the delay, as an assertion.
    pub async fn await_state(
        &mut self,
        handle: &ResourceHandle,
        expectation: &Expectation,
    ) -> Result<DecodedHeaders> {
        let client = self.client;
        let session = self.session;

        match self.wait.clone() {
            WaitStrategy::Poll(policy) => {
                let polled = poll_until(
                    &policy,
                    move || client.retrieve(session, handle),
                    |decoded| expectation.holds(decoded),
                )
                .await;

                match polled {
                    Ok(polled) => {
                        debug!(
                            resource = %handle,
                            attempts = polled.attempts,
                            elapsed_ms = polled.elapsed.as_millis() as u64,
                            "reached {}", expectation
                        );
                        self.records.push(AssertionRecord {
                            description: format!("{} reaches {}", handle, expectation),
                            passed: true,
                        });
                        Ok(polled.value)
                    }
                    Err(PollError::Client(e)) => Err(e.into()),
                    Err(PollError::Timeout {
                        last,
                        attempts,
                        elapsed,
                    }) => {
                        error!(
                            resource = %handle,
                            attributes = ?last.attributes(),
                            "timed out waiting for {}", expectation
                        );
                        Err(HarnessError::Timeout {
                            path: handle.path().to_string(),
                            expectation: expectation.to_string(),
                            waited: elapsed,
                            attempts,
                        })
                    }
                    Err(PollError::InvalidPolicy(reason)) => {
                        Err(HarnessError::Config(format!("poll policy: {}", reason)))
                    }
                }
            }
            WaitStrategy::Fixed(delay) => {
                tokio::time::sleep(delay).await;
                let decoded = client.retrieve(session, handle).await?;
                self.check(expectation.holds(&decoded), || {
                    format!("{} reaches {}", handle, expectation)
                })?;
                Ok(decoded)
            }
        }
    }

    /// Check that a request is rejected by the service.
    ///
    /// A success response is an assertion failure, not a protocol violation.
    pub async fn expect_rejected(&mut self, method: Method, path: &str) -> Result<()> {
        match self
            .client
            .expect_rejection(self.session, method.clone(), path)
            .await
        {
            Ok(status) => self.check(true, || {
                format!("{} {} rejected with {}", method, path, status)
            }),
            Err(ClientError::UnexpectedSuccess { status, .. }) => self.check(false, || {
                format!("{} {} should be rejected, got {}", method, path, status)
            }),
            Err(e) => Err(e.into()),
        }
    }

    /// Destroy `handle` after a scenario body has produced `outcome`.
    ///
    /// Always attempts the destroy. A body failure wins over a cleanup
    /// failure, which is then only logged. Cleanup is never retried.
    pub async fn teardown<T>(&mut self, handle: ResourceHandle, outcome: Result<T>) -> Result<T> {
        let path = handle.path().to_string();
        let destroyed = self.client.destroy(self.session, handle).await;

        match (outcome, destroyed) {
            (Ok(value), Ok(_)) => {
                info!(resource = %path, "destroyed");
                Ok(value)
            }
            (Ok(_), Err(e)) => {
                error!(resource = %path, error = %e, "cleanup failed");
                Err(e.into())
            }
            (Err(e), Ok(_)) => {
                info!(resource = %path, "destroyed after failure");
                Err(e)
            }
            (Err(e), Err(cleanup)) => {
                warn!(resource = %path, error = %cleanup, "cleanup failed after earlier failure");
                Err(e)
            }
        }
    }
}
