//! End-to-end tests for the gateway update workflow against an in-memory store

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use gatewayctl_core::{
    ApiError, AutoScaleBounds, Connection, CoreError, ForceConfirmation, Gateway, GatewayIdentity,
    GatewayStore, Result, Tags, UpdateGatewayParams, UpdateGatewayRequest, UpdateOutcome,
    spawn_update_gateway, update_gateway,
};
use pretty_assertions::assert_eq;

const GATEWAY_ID: &str =
    "/subscriptions/s/resourceGroups/rg1/providers/Microsoft.Network/expressRouteGateways/gw1";

/// Store backed by a map, counting calls
#[derive(Default)]
struct InMemoryStore {
    gateways: Mutex<HashMap<(String, String), Gateway>>,
    fetches: AtomicUsize,
    persists: AtomicUsize,
    fail_persist_with: Option<ApiError>,
}

impl InMemoryStore {
    fn with_gateway(gateway: Gateway) -> Self {
        let store = Self::default();
        store.insert(gateway);
        store
    }

    fn insert(&self, gateway: Gateway) {
        self.gateways.lock().unwrap().insert(
            (gateway.resource_group_name.clone(), gateway.name.clone()),
            gateway,
        );
    }

    fn stored(&self, resource_group_name: &str, name: &str) -> Option<Gateway> {
        self.gateways
            .lock()
            .unwrap()
            .get(&(resource_group_name.to_string(), name.to_string()))
            .cloned()
    }

    fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    fn persist_count(&self) -> usize {
        self.persists.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl GatewayStore for InMemoryStore {
    async fn fetch_gateway(
        &self,
        resource_group_name: &str,
        name: &str,
    ) -> std::result::Result<Option<Gateway>, ApiError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        Ok(self.stored(resource_group_name, name))
    }

    async fn create_or_update_gateway(
        &self,
        resource_group_name: &str,
        name: &str,
        gateway: &Gateway,
        tags: Option<&Tags>,
    ) -> std::result::Result<Gateway, ApiError> {
        self.persists.fetch_add(1, Ordering::SeqCst);
        if let Some(err) = &self.fail_persist_with {
            return Err(err.clone());
        }

        let mut saved = gateway.clone();
        saved.resource_group_name = resource_group_name.to_string();
        saved.name = name.to_string();
        if let Some(tags) = tags {
            saved.tags = tags.clone();
        }
        saved.provisioning_state = Some("Succeeded".to_string());
        self.insert(saved.clone());
        Ok(saved)
    }
}

fn existing_gateway() -> Gateway {
    Gateway::new("rg1", "gw1")
        .with_bounds(1, 5)
        .with_connections(vec![
            Connection::new("old1"),
            Connection::new("old2"),
            Connection::new("old3"),
        ])
        .with_tag("env", "prod")
}

fn connection_names(gateway: &Gateway) -> Vec<&str> {
    gateway.connections.iter().map(|c| c.name.as_str()).collect()
}

fn decline(_description: &str) -> Result<bool> {
    Ok(false)
}

#[tokio::test]
async fn updates_bounds_and_replaces_connections() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(2, 10)
            .with_connections(vec![Connection::new("c1"), Connection::new("c2")]),
    );

    let outcome = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap();

    let gateway = outcome.gateway().expect("persisted");
    assert_eq!(gateway.auto_scale_bounds, AutoScaleBounds { min: 2, max: 10 });
    assert_eq!(connection_names(gateway), vec!["c1", "c2"]);
    assert_eq!(store.fetch_count(), 1);
    assert_eq!(store.persist_count(), 1);

    let stored = store.stored("rg1", "gw1").unwrap();
    assert_eq!(stored.auto_scale_bounds, AutoScaleBounds { min: 2, max: 10 });
    assert_eq!(connection_names(&stored), vec!["c1", "c2"]);
}

#[tokio::test]
async fn inverted_bounds_fail_and_leave_store_unchanged() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(10, 2).with_connections(vec![Connection::new("c1")]),
    );

    let err = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::InvalidBounds { min: 10, max: 2 }));
    assert_eq!(store.persist_count(), 0);
    assert_eq!(store.stored("rg1", "gw1").unwrap(), existing_gateway());
}

#[tokio::test]
async fn bounds_above_signed_range_fail_before_persisting() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(1, u32::MAX),
    );

    let err = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CoreError::BoundsOutOfRange { field: "max", value: u32::MAX }
    ));
    assert_eq!(store.persist_count(), 0);
}

#[tokio::test]
async fn omitted_connections_are_kept() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(3, 4),
    );

    let outcome = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap();

    let gateway = outcome.gateway().unwrap();
    assert_eq!(connection_names(gateway), vec!["old1", "old2", "old3"]);
    assert_eq!(gateway.auto_scale_bounds, AutoScaleBounds { min: 3, max: 4 });
}

#[tokio::test]
async fn missing_gateway_is_not_found() {
    let store = InMemoryStore::default();
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "nope"),
        UpdateGatewayParams::new(1, 2),
    );

    let err = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap_err();

    match err {
        CoreError::NotFound {
            resource_group_name,
            name,
        } => {
            assert_eq!(resource_group_name, "rg1");
            assert_eq!(name, "nope");
        }
        other => panic!("expected NotFound, got {other:?}"),
    }
    assert_eq!(store.persist_count(), 0);
}

#[tokio::test]
async fn not_found_is_reported_before_bad_bounds() {
    let store = InMemoryStore::default();
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(10, 2),
    );

    let err = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::NotFound { .. }));
}

#[tokio::test]
async fn resource_id_resolves_like_name() {
    let store = InMemoryStore::with_gateway(existing_gateway());

    let by_id = update_gateway(
        &store,
        UpdateGatewayRequest::new(
            GatewayIdentity::by_resource_id(GATEWAY_ID),
            UpdateGatewayParams::new(2, 3),
        ),
        &ForceConfirmation,
    )
    .await
    .unwrap();

    let by_name = update_gateway(
        &store,
        UpdateGatewayRequest::new(
            GatewayIdentity::by_name("rg1", "gw1"),
            UpdateGatewayParams::new(2, 3),
        ),
        &ForceConfirmation,
    )
    .await
    .unwrap();

    assert_eq!(by_id, by_name);
    assert_eq!(store.fetch_count(), 2);
}

#[tokio::test]
async fn malformed_resource_id_fails_without_remote_calls() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_resource_id("/subscriptions/s/resourceGroups/rg1"),
        UpdateGatewayParams::new(1, 2),
    );

    let err = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap_err();

    assert!(matches!(err, CoreError::MalformedIdentifier(_)));
    assert_eq!(store.fetch_count(), 0);
    assert_eq!(store.persist_count(), 0);
}

#[tokio::test]
async fn input_object_skips_fetch() {
    let store = InMemoryStore::default();
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_object(existing_gateway()),
        UpdateGatewayParams::new(2, 10).with_connections(vec![Connection::new("c1")]),
    );

    let outcome = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap();

    assert_eq!(store.fetch_count(), 0);
    assert_eq!(store.persist_count(), 1);
    let gateway = outcome.gateway().unwrap();
    assert_eq!(gateway.resource_group_name, "rg1");
    assert_eq!(connection_names(gateway), vec!["c1"]);
}

#[tokio::test]
async fn input_object_still_validates_bounds() {
    let store = InMemoryStore::default();
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_object(existing_gateway()),
        UpdateGatewayParams::new(7, 6),
    );

    let err = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap_err();
    assert!(matches!(err, CoreError::InvalidBounds { min: 7, max: 6 }));
    assert_eq!(store.persist_count(), 0);
}

#[tokio::test]
async fn declining_confirmation_never_persists() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(2, 10),
    );

    let outcome = update_gateway(&store, request, &decline).await.unwrap();

    assert_eq!(outcome, UpdateOutcome::Aborted);
    assert!(outcome.gateway().is_none());
    assert_eq!(store.persist_count(), 0);
    assert_eq!(store.stored("rg1", "gw1").unwrap(), existing_gateway());
}

#[tokio::test]
async fn confirmation_is_asked_about_the_resolved_gateway() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = Arc::clone(&seen);
    let gate = move |description: &str| -> Result<bool> {
        sink.lock().unwrap().push(description.to_string());
        Ok(true)
    };

    update_gateway(
        &store,
        UpdateGatewayRequest::new(
            GatewayIdentity::by_resource_id(GATEWAY_ID),
            UpdateGatewayParams::new(1, 1),
        ),
        &gate,
    )
    .await
    .unwrap();

    let seen = seen.lock().unwrap();
    assert_eq!(seen.len(), 1);
    assert!(seen[0].contains("'gw1'"));
    assert!(seen[0].contains("'rg1'"));
}

#[tokio::test]
async fn tags_are_passed_through_to_the_store() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(1, 2).with_tag("team", "net"),
    );

    let outcome = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap();

    let tags = &outcome.gateway().unwrap().tags;
    assert_eq!(tags.len(), 1);
    assert_eq!(tags["team"], "net");
}

#[tokio::test]
async fn persist_errors_propagate_verbatim() {
    let store = InMemoryStore {
        fail_persist_with: Some(ApiError::from_status(409, "Another operation is in progress")),
        ..Default::default()
    };
    store.insert(existing_gateway());

    let err = update_gateway(
        &store,
        UpdateGatewayRequest::new(
            GatewayIdentity::by_name("rg1", "gw1"),
            UpdateGatewayParams::new(1, 2),
        ),
        &ForceConfirmation,
    )
    .await
    .unwrap_err();

    assert!(err.is_conflict());
    match err {
        CoreError::RemoteOperationFailed(ApiError::Conflict { message }) => {
            assert_eq!(message, "Another operation is in progress");
        }
        other => panic!("expected remote conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn background_job_produces_the_same_result() {
    let store = Arc::new(InMemoryStore::with_gateway(existing_gateway()));
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(2, 10)
            .with_connections(vec![Connection::new("c1"), Connection::new("c2")]),
    );

    let job = spawn_update_gateway(store.clone(), request, Arc::new(ForceConfirmation));
    assert!(job.description().contains("gw1"));

    let outcome = job.wait().await.unwrap();
    let gateway = outcome.gateway().unwrap();
    assert_eq!(gateway.auto_scale_bounds, AutoScaleBounds { min: 2, max: 10 });
    assert_eq!(connection_names(gateway), vec!["c1", "c2"]);
    assert_eq!(store.persist_count(), 1);
}

#[tokio::test]
async fn background_job_reports_failures() {
    let store = Arc::new(InMemoryStore::default());
    let job = spawn_update_gateway(
        store,
        UpdateGatewayRequest::new(
            GatewayIdentity::by_name("rg1", "gw1"),
            UpdateGatewayParams::new(1, 2),
        ),
        Arc::new(ForceConfirmation),
    );

    assert!(matches!(job.wait().await, Err(CoreError::NotFound { .. })));
}

#[tokio::test]
async fn rerunning_the_same_update_is_idempotent() {
    let store = InMemoryStore::with_gateway(existing_gateway());
    let request = UpdateGatewayRequest::new(
        GatewayIdentity::by_name("rg1", "gw1"),
        UpdateGatewayParams::new(2, 10).with_connections(vec![Connection::new("c1")]),
    );

    let first = update_gateway(&store, request.clone(), &ForceConfirmation)
        .await
        .unwrap();
    let second = update_gateway(&store, request, &ForceConfirmation)
        .await
        .unwrap();

    assert_eq!(first, second);
}
