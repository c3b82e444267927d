//! Scenarios driven end to end against the in-process mock service.

mod support;

use std::time::Duration;

use axum::http::StatusCode;
use occi_harness::{
    AssertionPolicy, Harness, HarnessConfigBuilder, HarnessError, Report, Scenario, Status,
    WaitStrategy,
};
use occi_harness_client::{PollPolicy, StaticToken};
use support::{MockOptions, MockService, TOKEN};

async fn connect(config: HarnessConfigBuilder) -> Harness {
    Harness::connect(config.build().unwrap()).await.unwrap()
}

fn status(report: &Report, scenario: Scenario) -> Status {
    report.outcome(scenario).unwrap().status.clone()
}

// ─────────────────────────────────────────────────────────────────────────────
// Full run
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_all_scenarios_pass_and_leave_nothing_behind() {
    let mock = MockService::start(MockOptions::default()).await;
    let harness = connect(mock.config()).await;

    let report = harness.run(&Scenario::ALL).await;

    for outcome in report.outcomes() {
        assert_eq!(outcome.status, Status::Passed, "{}", outcome);
    }
    assert!(report.success());
    assert_eq!(report.total(), 5);
    assert_eq!(report.advisory_failures(), 0);
    assert!(mock.live_resources().is_empty(), "{:?}", mock.live_resources());
    assert_eq!(mock.mixin_locations(), ["/mygroups/"]);
    assert_eq!(
        mock.actions(),
        [
            "stop",
            "start",
            "alloc_float_ip",
            "dealloc_float_ip",
            "chg_pwd",
            "create_image"
        ]
    );
}

#[tokio::test]
async fn test_storage_link_quotes_whole_urls() {
    let mock = MockService::start(MockOptions::default()).await;
    let harness = connect(mock.config()).await;

    let report = harness.run(&[Scenario::Storage]).await;
    assert!(report.success());

    // The VM is created first, then the volume.
    let origin = mock.origin();
    assert_eq!(
        mock.link_attributes(),
        [
            format!(r#"occi.core.source="{origin}/compute/1""#),
            format!(r#"occi.core.target="{origin}/storage/2""#),
            r#"occi.storagelink.deviceid="/dev/vdc""#.to_string(),
        ]
    );
}

// ─────────────────────────────────────────────────────────────────────────────
// Wait discipline
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_poll_timeout_fails_scenario_and_run_continues() {
    let mock = MockService::start(MockOptions {
        never_activate: true,
        ..Default::default()
    })
    .await;
    let config = mock.config().wait(WaitStrategy::Poll(
        PollPolicy::fast().timeout(Duration::from_millis(200)),
    ));
    let harness = connect(config).await;

    let report = harness.run(&[Scenario::Compute, Scenario::Discovery]).await;

    match status(&report, Scenario::Compute) {
        Status::Failed(reason) => assert!(reason.contains("did not satisfy"), "{reason}"),
        other => panic!("expected a timeout failure, got {other:?}"),
    }
    assert_eq!(status(&report, Scenario::Discovery), Status::Passed);
    assert!(!report.aborted());
    assert!(!report.success());
    assert!(mock.live_resources().is_empty());
}

#[tokio::test]
async fn test_fixed_wait_with_advisory_assertions_keeps_going() {
    let mock = MockService::start(MockOptions {
        settle_gets: 3,
        ..Default::default()
    })
    .await;
    let config = mock
        .config()
        .wait(WaitStrategy::Fixed(Duration::ZERO))
        .assertions(AssertionPolicy::Advisory);
    let harness = connect(config).await;

    let report = harness.run(&[Scenario::Compute]).await;

    let outcome = report.outcome(Scenario::Compute).unwrap();
    assert_eq!(outcome.status, Status::Passed);
    assert!(outcome.advisory_failures >= 1);
    assert!(report.success());
    assert_eq!(mock.actions(), ["stop", "start"]);
    assert!(mock.live_resources().is_empty());
}

#[tokio::test]
async fn test_fixed_wait_with_fatal_assertions_fails_scenario() {
    let mock = MockService::start(MockOptions {
        settle_gets: 3,
        ..Default::default()
    })
    .await;
    let config = mock
        .config()
        .wait(WaitStrategy::Fixed(Duration::ZERO))
        .assertions(AssertionPolicy::Fatal);
    let harness = connect(config).await;

    let report = harness.run(&[Scenario::Compute]).await;

    match status(&report, Scenario::Compute) {
        Status::Failed(reason) => assert!(reason.starts_with("assertion failed"), "{reason}"),
        other => panic!("expected an assertion failure, got {other:?}"),
    }
    // Stopped before any action, but still torn down.
    assert!(mock.actions().is_empty());
    assert!(mock.live_resources().is_empty());
    // The failure that ended the scenario is not also advisory.
    assert_eq!(report.outcome(Scenario::Compute).unwrap().advisory_failures, 0);
}

#[tokio::test]
async fn test_fixed_wait_passes_when_backend_settles_in_time() {
    let mock = MockService::start(MockOptions {
        settle_gets: 1,
        ..Default::default()
    })
    .await;
    let config = mock
        .config()
        .wait(WaitStrategy::Fixed(Duration::from_millis(1)))
        .assertions(AssertionPolicy::Fatal);
    let harness = connect(config).await;

    let report = harness.run(&[Scenario::Compute]).await;
    assert!(report.success());
    assert_eq!(report.advisory_failures(), 0);
}

#[tokio::test]
async fn test_start_waits_for_stop_to_finish() {
    let mock = MockService::start(MockOptions {
        stop_pending_gets: 3,
        ..Default::default()
    })
    .await;
    let harness = connect(mock.config().assertions(AssertionPolicy::Fatal)).await;

    let report = harness.run(&[Scenario::Compute]).await;

    assert_eq!(status(&report, Scenario::Compute), Status::Passed);
    assert_eq!(mock.actions(), ["stop", "start"]);
    assert!(mock.live_resources().is_empty());
}

#[tokio::test]
async fn test_fixed_wait_settles_before_every_read_back() {
    let mock = MockService::start(MockOptions {
        settle_gets: 1,
        ..Default::default()
    })
    .await;
    let settle = Duration::from_millis(50);
    let config = mock
        .config()
        .wait(WaitStrategy::Fixed(settle))
        .assertions(AssertionPolicy::Fatal);
    let harness = connect(config).await;

    let report = harness.run(&[Scenario::Security, Scenario::Storage]).await;
    assert!(report.success());

    for kind in ["rule", "compute", "storage", "storagelink"] {
        let delays = mock.first_read_delays(kind);
        assert!(!delays.is_empty(), "no {kind} created");
        for delay in delays {
            let delay = delay.unwrap_or_else(|| panic!("{kind} never read back"));
            assert!(delay >= settle, "{kind} read back after {delay:?}");
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Fail-fast
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_protocol_violation_aborts_run_after_cleanup() {
    let mock = MockService::start(MockOptions {
        fail_create: Some(("/storage/", StatusCode::INTERNAL_SERVER_ERROR)),
        ..Default::default()
    })
    .await;
    let harness = connect(mock.config()).await;

    let report = harness
        .run(&[Scenario::Storage, Scenario::Compute, Scenario::Discovery])
        .await;

    match status(&report, Scenario::Storage) {
        Status::Aborted(reason) => assert!(reason.contains("500"), "{reason}"),
        other => panic!("expected abort, got {other:?}"),
    }
    assert_eq!(status(&report, Scenario::Compute), Status::Skipped);
    assert_eq!(status(&report, Scenario::Discovery), Status::Skipped);
    assert!(report.aborted());
    // The VM created before the failing volume was destroyed.
    assert!(mock.live_resources().is_empty());
}

#[tokio::test]
async fn test_every_request_carries_the_credential() {
    let mock = MockService::start(MockOptions::default()).await;
    let harness = Harness::connect_with(mock.config().build().unwrap(), &StaticToken::new("stale"))
        .await
        .unwrap();

    let report = harness.run(&[Scenario::Discovery]).await;

    match status(&report, Scenario::Discovery) {
        Status::Aborted(reason) => assert!(reason.contains("401"), "{reason}"),
        other => panic!("expected abort, got {other:?}"),
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Handle invalidation
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_invalidation_passes_against_conforming_service() {
    let mock = MockService::start(MockOptions::default()).await;
    let harness = connect(mock.config().assertions(AssertionPolicy::Fatal)).await;

    let report = harness.run(&[Scenario::Invalidation]).await;
    assert!(report.success());
    assert!(mock.live_resources().is_empty());
}

#[tokio::test]
async fn test_invalidation_flags_resources_that_survive_delete() {
    let mock = MockService::start(MockOptions {
        ignore_deletes: true,
        ..Default::default()
    })
    .await;
    let harness = connect(mock.config()).await;

    let report = harness.run(&[Scenario::Invalidation]).await;

    let outcome = report.outcome(Scenario::Invalidation).unwrap();
    assert_eq!(outcome.status, Status::Passed);
    assert_eq!(outcome.advisory_failures, 2);
    assert_eq!(mock.live_resources(), ["/compute/1"]);
}

// ─────────────────────────────────────────────────────────────────────────────
// Identity
// ─────────────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let mock = MockService::start(MockOptions::default()).await;
    let config = mock.config().password("wrong").build().unwrap();

    let err = match Harness::connect(config).await {
        Ok(_) => panic!("expected the identity service to reject the password"),
        Err(e) => e,
    };

    assert!(err.is_fatal());
    match err {
        HarnessError::Client(e) => assert_eq!(e.status(), Some(StatusCode::UNAUTHORIZED)),
        other => panic!("expected a client error, got {other:?}"),
    }
}

#[tokio::test]
async fn test_configured_token_skips_identity_service() {
    let mock = MockService::start(MockOptions::default()).await;
    // Nothing listens on port 1.
    let config = mock.config().identity_endpoint("127.0.0.1:1").token(TOKEN);
    let harness = connect(config).await;

    let report = harness.run(&[Scenario::Discovery]).await;
    assert!(report.success());
}
