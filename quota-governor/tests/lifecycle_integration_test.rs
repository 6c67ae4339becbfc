//! Integration tests for the subscription lifecycle.
//!
//! Drives the governor through the public hook surface against the in-memory stores.

use std::sync::Arc;

use proptest::prelude::*;
use quota_governor::{
    AllocationOrder, GovernorConfig, GovernorError, LifecycleEvent, LifecycleOutcome,
    QuotaGovernor, SubscriptionLifecycle,
    error::SUBSCRIPTION_LIMIT_EXHAUSTED,
    model::{AccountId, Subscription, Workspace},
    policy::{Tier, to_megabytes},
    store::{InMemorySubscriptionStore, InMemoryWorkspaceStore, WorkspaceStore},
};

const RUNNER_LIFETIME: &str = "codenvy:runner_lifetime";
const BUILDER_EXECUTION_TIME: &str = "codenvy:builder_execution_time";
const RUNNER_RAM: &str = "codenvy:runner_ram";

struct Fixture {
    workspaces: Arc<InMemoryWorkspaceStore>,
    subscriptions: Arc<InMemorySubscriptionStore>,
    governor: QuotaGovernor,
}

impl Fixture {
    fn with_workspaces(count: usize) -> Self {
        let workspaces = (1..=count)
            .map(|i| {
                Workspace::new(format!("ws-{i}").as_str(), "acc-1")
                    .with_name(format!("project-{i}"))
            })
            .collect();
        Self::build(workspaces, &GovernorConfig::default())
    }

    fn build(workspaces: Vec<Workspace>, config: &GovernorConfig) -> Self {
        let workspaces = Arc::new(InMemoryWorkspaceStore::with_workspaces(workspaces));
        let subscriptions = Arc::new(InMemorySubscriptionStore::new());
        let governor =
            QuotaGovernor::with_config(workspaces.clone(), subscriptions.clone(), config)
                .expect("valid config");
        Self { workspaces, subscriptions, governor }
    }

    fn listed(&self) -> Vec<Workspace> {
        self.workspaces.list_by_account(&AccountId::new("acc-1")).expect("listing succeeds")
    }

    fn ram_values(&self) -> Vec<Option<String>> {
        self.listed().iter().map(|ws| ws.attribute(RUNNER_RAM).map(str::to_owned)).collect()
    }
}

fn subscription(package: &str, ram: &str) -> Subscription {
    Subscription::new("sub-1", "acc-1", "Saas")
        .with_property("Package", package)
        .with_property("RAM", ram)
}

#[test]
fn test_full_lifecycle_flow() {
    let fx = Fixture::with_workspaces(3);
    let sub = subscription("Team", "2GB");

    fx.governor.validate_before_create(&sub).expect("creation allowed");
    fx.subscriptions.insert(sub.clone()).expect("persisted");

    let report = fx.governor.apply_after_create(&sub).expect("applied");
    assert_eq!(report.tier, Tier::Team);
    assert_eq!(report.ram_megabytes, 2048);
    assert_eq!(report.workspaces_updated.len(), 3);

    for ws in fx.listed() {
        assert_eq!(ws.attribute(RUNNER_LIFETIME), Some("3600"));
        assert_eq!(ws.attribute(BUILDER_EXECUTION_TIME), Some("600"));
    }
    assert_eq!(
        fx.ram_values(),
        vec![Some("2048".to_owned()), Some("0".to_owned()), Some("0".to_owned())]
    );

    // A second subscription for the same service is refused.
    let second = Subscription::new("sub-2", "acc-1", "Saas")
        .with_property("Package", "Team")
        .with_property("RAM", "1GB");
    let err = fx.governor.validate_before_create(&second).unwrap_err();
    assert_eq!(err, GovernorError::Conflict(SUBSCRIPTION_LIMIT_EXHAUSTED.into()));

    let report = fx.governor.revert_on_remove(&sub).expect("listing succeeds");
    assert!(report.is_clean());
    assert_eq!(report.visited(), 3);

    let listed = fx.listed();
    for ws in &listed {
        assert_eq!(ws.attribute(RUNNER_LIFETIME), None);
        assert_eq!(ws.attribute(BUILDER_EXECUTION_TIME), None);
    }
    assert_eq!(fx.ram_values(), vec![None, Some("0".to_owned()), Some("0".to_owned())]);
    // Names are never touched.
    assert_eq!(listed[0].name, "project-1");
}

#[test]
fn test_validate_without_workspaces_conflicts() {
    let fx = Fixture::with_workspaces(0);
    let err = fx.governor.validate_before_create(&subscription("Team", "1GB")).unwrap_err();
    assert_eq!(err, GovernorError::Conflict("Given account doesn't have any workspaces.".into()));
}

#[test]
fn test_unlimited_tiers_write_minus_one() {
    for package in ["project", "ENTERPRISE"] {
        let fx = Fixture::with_workspaces(2);
        fx.governor.apply_after_create(&subscription(package, "512MB")).expect("applied");

        for ws in fx.listed() {
            assert_eq!(ws.attribute(RUNNER_LIFETIME), Some("-1"));
            assert_eq!(ws.attribute(BUILDER_EXECUTION_TIME), Some("600"));
        }
        assert_eq!(fx.ram_values(), vec![Some("512".to_owned()), Some("0".to_owned())]);
    }
}

#[test]
fn test_unknown_tier_is_not_found_and_writes_nothing() {
    let fx = Fixture::with_workspaces(2);
    let err = fx.governor.apply_after_create(&subscription("Platinum", "1GB")).unwrap_err();

    assert_eq!(err, GovernorError::NotFound("Package Platinum not found".into()));
    assert!(fx.listed().iter().all(|ws| ws.attributes.is_empty()));
}

#[test]
fn test_malformed_ram_conflicts() {
    let fx = Fixture::with_workspaces(1);
    let err = fx.governor.reapply(&subscription("team", "2 TB")).unwrap_err();
    assert_eq!(err, GovernorError::Conflict("Subscription with such plan can't be added".into()));
}

#[test]
fn test_reapply_is_idempotent() {
    let fx = Fixture::with_workspaces(3);
    let sub = subscription("developer", "1GB");

    fx.governor.apply_after_create(&sub).expect("applied");
    let first = fx.listed();
    fx.governor.reapply(&sub).expect("reapplied");

    assert_eq!(fx.listed(), first);
}

#[test]
fn test_update_uses_only_new_snapshot() {
    let fx = Fixture::with_workspaces(2);
    let old = subscription("developer", "1GB");
    let new = subscription("enterprise", "3GB");

    fx.governor.apply_after_create(&old).expect("applied");
    let report = fx.governor.apply_after_update(&old, &new).expect("updated");

    assert_eq!(report.tier, Tier::Enterprise);
    assert_eq!(fx.ram_values(), vec![Some("3072".to_owned()), Some("0".to_owned())]);
    assert!(fx.listed().iter().all(|ws| ws.attribute(RUNNER_LIFETIME) == Some("-1")));
}

#[test]
fn test_update_ignores_invalid_old_snapshot() {
    let fx = Fixture::with_workspaces(2);
    let old = Subscription::new("sub-1", "acc-1", "Saas").with_property("Package", "Platinum");
    let new = subscription("team", "1GB");

    let report = fx.governor.apply_after_update(&old, &new).expect("updated");

    assert_eq!(report.tier, Tier::Team);
    assert_eq!(fx.ram_values(), vec![Some("1024".to_owned()), Some("0".to_owned())]);

    let bare_old = Subscription::new("sub-1", "acc-1", "Saas");
    assert!(fx.governor.apply_after_update(&bare_old, &new).is_ok());
}

#[test]
fn test_dispatch_routes_every_event() {
    let fx = Fixture::with_workspaces(2);
    let sub = subscription("team", "1GB");
    let updated = subscription("project", "2GB");

    assert_eq!(
        fx.governor.dispatch(LifecycleEvent::BeforeCreate(&sub)).expect("validated"),
        LifecycleOutcome::Validated
    );
    assert!(matches!(
        fx.governor.dispatch(LifecycleEvent::AfterCreate(&sub)),
        Ok(LifecycleOutcome::Applied(report)) if report.tier == Tier::Team
    ));
    assert!(matches!(
        fx.governor.dispatch(LifecycleEvent::Check(&sub)),
        Ok(LifecycleOutcome::Applied(report)) if report.ram_megabytes == 1024
    ));
    assert!(matches!(
        fx.governor.dispatch(LifecycleEvent::Update { old: &sub, new: &updated }),
        Ok(LifecycleOutcome::Applied(report)) if report.tier == Tier::Project
    ));
    assert!(matches!(
        fx.governor.dispatch(LifecycleEvent::Remove(&updated)),
        Ok(LifecycleOutcome::Reverted(report)) if report.is_clean()
    ));
}

#[test]
fn test_toml_config_drives_allocation() {
    let config = GovernorConfig::from_toml(
        r#"
        service_id = "Saas"
        attribute_prefix = "quota:"
        allocation_order = "workspace_id"
        "#,
    )
    .expect("valid TOML");
    assert_eq!(config.allocation_order, AllocationOrder::WorkspaceId);

    let fx = Fixture::build(
        vec![
            Workspace::new("ws-c", "acc-1"),
            Workspace::new("ws-a", "acc-1"),
            Workspace::new("ws-b", "acc-1"),
        ],
        &config,
    );
    let report = fx.governor.apply_after_create(&subscription("team", "1GB")).expect("applied");
    assert_eq!(report.allocated_to.as_str(), "ws-a");

    let ram_by_id: Vec<(String, Option<String>)> = fx
        .listed()
        .into_iter()
        .map(|ws| (ws.id.to_string(), ws.attribute("quota:runner_ram").map(str::to_owned)))
        .collect();
    assert!(ram_by_id.contains(&("ws-a".to_owned(), Some("1024".to_owned()))));
    assert!(ram_by_id.contains(&("ws-b".to_owned(), Some("0".to_owned()))));
    assert!(ram_by_id.contains(&("ws-c".to_owned(), Some("0".to_owned()))));
    assert!(fx.listed().iter().all(|ws| ws.attribute(RUNNER_RAM).is_none()));
}

#[test]
fn test_ram_conversion_examples() {
    assert_eq!(to_megabytes("1GB"), Ok(1024));
    assert_eq!(to_megabytes("512MB"), Ok(512));
    assert_eq!(to_megabytes("0MB"), Ok(0));
    assert!(to_megabytes("1gb").is_err());
    assert!(to_megabytes("GB").is_err());
    assert!(to_megabytes("").is_err());
}

proptest! {
    #[test]
    fn prop_exactly_one_workspace_holds_ram(count in 1usize..12, gigabytes in 1u64..64) {
        let fx = Fixture::with_workspaces(count);
        let sub = subscription("team", &format!("{gigabytes}GB"));
        fx.governor.apply_after_create(&sub).expect("applied");

        let values = fx.ram_values();
        let expected = (gigabytes * 1024).to_string();
        let holders = values.iter().filter(|v| v.as_deref() == Some(expected.as_str())).count();
        prop_assert_eq!(holders, 1);
        prop_assert_eq!(values.iter().filter(|v| v.as_deref() == Some("0")).count(), count - 1);

        let report = fx.governor.revert_on_remove(&sub).expect("reverted");
        prop_assert!(report.is_clean());
        let values = fx.ram_values();
        prop_assert_eq!(values.iter().filter(|v| v.is_none()).count(), 1);
        prop_assert_eq!(values.iter().filter(|v| v.as_deref() == Some("0")).count(), count - 1);
    }
}
