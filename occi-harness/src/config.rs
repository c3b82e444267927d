//! Harness configuration.
//!
//! Built with [`HarnessConfig::builder`] or read from `OCCI_*` environment
//! variables with [`HarnessConfig::from_env`].

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use occi_harness_client::{PollPolicy, ServiceEndpoint};

use crate::error::{HarnessError, Result};

/// Environment variable names.
pub mod env {
    pub const IDENTITY_ENDPOINT: &str = "OCCI_IDENTITY_ENDPOINT";
    pub const SERVICE_ENDPOINT: &str = "OCCI_SERVICE_ENDPOINT";
    pub const USERNAME: &str = "OCCI_USERNAME";
    pub const PASSWORD: &str = "OCCI_PASSWORD";
    /// Pre-issued token; skips the identity service when set.
    pub const TOKEN: &str = "OCCI_TOKEN";
    pub const WAIT: &str = "OCCI_WAIT";
    pub const POLL_TIMEOUT_SECS: &str = "OCCI_POLL_TIMEOUT_SECS";
    pub const ASSERTIONS: &str = "OCCI_ASSERTIONS";
    pub const REQUEST_TIMEOUT_SECS: &str = "OCCI_REQUEST_TIMEOUT_SECS";
}

/// Default configuration values.
pub mod defaults {
    pub const IDENTITY_ENDPOINT: &str = "127.0.0.1:5000";
    pub const SERVICE_ENDPOINT: &str = "127.0.0.1:8787";
    pub const USERNAME: &str = "admin";
    pub const PASSWORD: &str = "os4all";
}

/// How the orchestrator waits for a state transition.
#[derive(Clone, Debug, PartialEq)]
pub enum WaitStrategy {
    /// Re-retrieve with backoff until the expectation holds or the window
    /// closes.
    Poll(PollPolicy),
    /// Sleep unconditionally, then check the expectation once.
    Fixed(Duration),
}

impl Default for WaitStrategy {
    fn default() -> Self {
        WaitStrategy::Poll(PollPolicy::default())
    }
}

/// Parses `poll` or `fixed:<secs>`.
impl FromStr for WaitStrategy {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.eq_ignore_ascii_case("poll") {
            return Ok(WaitStrategy::default());
        }
        if let Some(secs) = s.strip_prefix("fixed:") {
            return parse_secs(env::WAIT, secs).map(WaitStrategy::Fixed);
        }
        Err(HarnessError::Config(format!(
            "{}: expected `poll` or `fixed:<secs>`, got {:?}",
            env::WAIT,
            s
        )))
    }
}

/// What happens when an expectation does not hold.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum AssertionPolicy {
    /// Log and count the failure, keep going.
    #[default]
    Advisory,
    /// Fail the scenario.
    Fatal,
}

impl FromStr for AssertionPolicy {
    type Err = HarnessError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "advisory" => Ok(AssertionPolicy::Advisory),
            "fatal" => Ok(AssertionPolicy::Fatal),
            other => Err(HarnessError::Config(format!(
                "{}: expected `advisory` or `fatal`, got {:?}",
                env::ASSERTIONS,
                other
            ))),
        }
    }
}

impl fmt::Display for AssertionPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AssertionPolicy::Advisory => f.write_str("advisory"),
            AssertionPolicy::Fatal => f.write_str("fatal"),
        }
    }
}

/// Complete, validated harness configuration.
#[derive(Clone)]
pub struct HarnessConfig {
    pub identity_endpoint: ServiceEndpoint,
    pub service_endpoint: ServiceEndpoint,
    pub username: String,
    pub password: String,
    pub token: Option<String>,
    pub wait: WaitStrategy,
    pub assertions: AssertionPolicy,
    pub request_timeout: Option<Duration>,
}

impl fmt::Debug for HarnessConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HarnessConfig")
            .field("identity_endpoint", &self.identity_endpoint)
            .field("service_endpoint", &self.service_endpoint)
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .field("wait", &self.wait)
            .field("assertions", &self.assertions)
            .field("request_timeout", &self.request_timeout)
            .finish()
    }
}

impl HarnessConfig {
    pub fn builder() -> HarnessConfigBuilder {
        HarnessConfigBuilder::new()
    }

    /// Read the configuration from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read the configuration through `lookup`, which maps a variable name to
    /// its value. Unset variables take their defaults.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut builder = HarnessConfigBuilder::new();
        if let Some(v) = lookup(env::IDENTITY_ENDPOINT) {
            builder = builder.identity_endpoint(v);
        }
        if let Some(v) = lookup(env::SERVICE_ENDPOINT) {
            builder = builder.service_endpoint(v);
        }
        if let Some(v) = lookup(env::USERNAME) {
            builder = builder.username(v);
        }
        if let Some(v) = lookup(env::PASSWORD) {
            builder = builder.password(v);
        }
        if let Some(v) = lookup(env::TOKEN).filter(|v| !v.is_empty()) {
            builder = builder.token(v);
        }
        if let Some(v) = lookup(env::WAIT) {
            builder = builder.wait(v.parse()?);
        }
        if let Some(v) = lookup(env::POLL_TIMEOUT_SECS) {
            builder = builder.poll_timeout(parse_secs(env::POLL_TIMEOUT_SECS, &v)?);
        }
        if let Some(v) = lookup(env::ASSERTIONS) {
            builder = builder.assertions(v.parse()?);
        }
        if let Some(v) = lookup(env::REQUEST_TIMEOUT_SECS) {
            builder = builder.request_timeout(parse_secs(env::REQUEST_TIMEOUT_SECS, &v)?);
        }
        builder.build()
    }
}

/// Builder for [`HarnessConfig`].
///
/// # Example
///
/// ```ignore
/// use occi_harness::{AssertionPolicy, HarnessConfig, WaitStrategy};
/// use std::time::Duration;
///
/// let config = HarnessConfig::builder()
///     .service_endpoint("10.0.0.5:8787")
///     .wait(WaitStrategy::Fixed(Duration::from_secs(15)))
///     .assertions(AssertionPolicy::Fatal)
///     .build()?;
/// ```
#[derive(Debug)]
pub struct HarnessConfigBuilder {
    identity_endpoint: String,
    service_endpoint: String,
    username: String,
    password: String,
    token: Option<String>,
    wait: WaitStrategy,
    poll_timeout: Option<Duration>,
    assertions: AssertionPolicy,
    request_timeout: Option<Duration>,
}

impl Default for HarnessConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl HarnessConfigBuilder {
    pub fn new() -> Self {
        Self {
            identity_endpoint: defaults::IDENTITY_ENDPOINT.to_string(),
            service_endpoint: defaults::SERVICE_ENDPOINT.to_string(),
            username: defaults::USERNAME.to_string(),
            password: defaults::PASSWORD.to_string(),
            token: None,
            wait: WaitStrategy::default(),
            poll_timeout: None,
            assertions: AssertionPolicy::default(),
            request_timeout: None,
        }
    }

    pub fn identity_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.identity_endpoint = endpoint.into();
        self
    }

    pub fn service_endpoint<S: Into<String>>(mut self, endpoint: S) -> Self {
        self.service_endpoint = endpoint.into();
        self
    }

    pub fn username<S: Into<String>>(mut self, username: S) -> Self {
        self.username = username.into();
        self
    }

    pub fn password<S: Into<String>>(mut self, password: S) -> Self {
        self.password = password.into();
        self
    }

    /// Use a pre-issued token instead of the identity service.
    pub fn token<S: Into<String>>(mut self, token: S) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn wait(mut self, wait: WaitStrategy) -> Self {
        self.wait = wait;
        self
    }

    /// Override the poll window. Has no effect with [`WaitStrategy::Fixed`].
    pub fn poll_timeout(mut self, timeout: Duration) -> Self {
        self.poll_timeout = Some(timeout);
        self
    }

    pub fn assertions(mut self, policy: AssertionPolicy) -> Self {
        self.assertions = policy;
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Result<HarnessConfig> {
        let identity_endpoint = ServiceEndpoint::parse(&self.identity_endpoint)
            .map_err(|e| HarnessError::Config(format!("identity endpoint: {}", e)))?;
        let service_endpoint = ServiceEndpoint::parse(&self.service_endpoint)
            .map_err(|e| HarnessError::Config(format!("service endpoint: {}", e)))?;

        let wait = match (self.wait, self.poll_timeout) {
            (WaitStrategy::Poll(policy), Some(timeout)) => WaitStrategy::Poll(policy.timeout(timeout)),
            (wait, _) => wait,
        };
        if let WaitStrategy::Poll(policy) = &wait {
            policy
                .validate()
                .map_err(|e| HarnessError::Config(format!("poll policy: {}", e)))?;
        }

        Ok(HarnessConfig {
            identity_endpoint,
            service_endpoint,
            username: self.username,
            password: self.password,
            token: self.token,
            wait,
            assertions: self.assertions,
            request_timeout: self.request_timeout,
        })
    }
}

fn parse_secs(var: &str, value: &str) -> Result<Duration> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_secs)
        .map_err(|e| HarnessError::Config(format!("{}: {:?} is not a number of seconds: {}", var, value, e)))
}
