//! In-process OCCI and identity service.
//!
//! Serves the Keystone v2.0 token endpoint and a small `text/occi` backend
//! with compute, storage and storage link collections, user mixins and
//! asynchronous state transitions: a pending transition applies on the Nth
//! retrieve of the resource.

#![allow(dead_code)]

use std::collections::BTreeMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Json;
use axum::Router;
use axum::extract::State;
use axum::http::{HeaderMap, HeaderValue, Method, StatusCode, Uri};
use axum::response::{IntoResponse, Response};
use axum::routing::post;
use occi_harness::{HarnessConfig, HarnessConfigBuilder, WaitStrategy};
use occi_harness_client::PollPolicy;

pub const TOKEN: &str = "mock-token";
pub const USERNAME: &str = "admin";
pub const PASSWORD: &str = "os4all";

const INFRASTRUCTURE: &str = "http://schemas.ogf.org/occi/infrastructure#";
const COMPUTE_ACTION: &str = "http://schemas.ogf.org/occi/infrastructure/compute/action#";

#[derive(Clone, Debug)]
pub struct MockOptions {
    /// Retrieves a pending resource needs before its transition applies.
    pub settle_gets: u32,
    /// Compute resources never become active.
    pub never_activate: bool,
    /// DELETE answers 200 but keeps the resource.
    pub ignore_deletes: bool,
    /// Answer POSTs to this collection with this status.
    pub fail_create: Option<(&'static str, StatusCode)>,
    /// Retrieves that render `pending` after `stop` before the VM is
    /// `inactive`. Zero goes straight to `inactive`.
    pub stop_pending_gets: u32,
}

impl Default for MockOptions {
    fn default() -> Self {
        Self {
            settle_gets: 2,
            never_activate: false,
            ignore_deletes: false,
            fail_create: None,
            stop_pending_gets: 0,
        }
    }
}

#[derive(Debug)]
struct Resource {
    collection: String,
    categories: Vec<String>,
    attributes: Vec<String>,
    /// State attribute name and current value.
    state: Option<(&'static str, String)>,
    /// Retrieves left and target state.
    pending: Option<(u32, String)>,
}

impl Resource {
    fn has_kind(&self, term: &str) -> bool {
        has_term(&self.categories, term)
    }

    fn is_in(&self, value: &str) -> bool {
        matches!(&self.state, Some((_, current)) if current == value)
    }

    fn schedule(&mut self, settle_gets: u32, target: &str) {
        self.pending = Some((settle_gets.max(1), target.to_string()));
    }

    /// Count one retrieve against the pending transition.
    fn observe(&mut self) {
        if let Some((left, target)) = self.pending.take() {
            if left <= 1 {
                if let Some((_, current)) = self.state.as_mut() {
                    *current = target;
                }
            } else {
                self.pending = Some((left - 1, target));
            }
        }
    }
}

#[derive(Debug, Default)]
struct MockState {
    options: MockOptions,
    next_id: u64,
    resources: BTreeMap<String, Resource>,
    /// (term, location) of registered mixins.
    mixins: Vec<(String, String)>,
    /// (resource path, action term) in arrival order.
    actions: Vec<(String, String)>,
    /// Attribute tokens of the last storage link request.
    link_attributes: Vec<String>,
    /// (kind, path, when) of every created resource.
    created: Vec<(&'static str, String, Instant)>,
    /// (path, when) of every resource retrieve.
    reads: Vec<(String, Instant)>,
}

type Shared = Arc<Mutex<MockState>>;

pub struct MockService {
    addr: SocketAddr,
    state: Shared,
}

impl MockService {
    pub async fn start(options: MockOptions) -> Self {
        let state: Shared = Arc::new(Mutex::new(MockState {
            options,
            ..Default::default()
        }));
        let app = Router::new()
            .route("/v2.0/tokens", post(issue_token))
            .fallback(occi)
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        Self { addr, state }
    }

    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    pub fn origin(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Config pointed at this service with a fast poll.
    pub fn config(&self) -> HarnessConfigBuilder {
        HarnessConfig::builder()
            .identity_endpoint(self.addr.to_string())
            .service_endpoint(self.addr.to_string())
            .username(USERNAME)
            .password(PASSWORD)
            .wait(WaitStrategy::Poll(PollPolicy::fast()))
            .request_timeout(Duration::from_secs(5))
    }

    /// Paths of resources that still exist.
    pub fn live_resources(&self) -> Vec<String> {
        self.state.lock().unwrap().resources.keys().cloned().collect()
    }

    pub fn actions(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .actions
            .iter()
            .map(|(_, action)| action.clone())
            .collect()
    }

    pub fn link_attributes(&self) -> Vec<String> {
        self.state.lock().unwrap().link_attributes.clone()
    }

    /// Time from each creation of `kind` to the first retrieve of that
    /// resource, `None` if it was never read back.
    pub fn first_read_delays(&self, kind: &str) -> Vec<Option<Duration>> {
        let state = self.state.lock().unwrap();
        state
            .created
            .iter()
            .filter(|(k, _, _)| *k == kind)
            .map(|(_, path, created)| {
                state
                    .reads
                    .iter()
                    .find(|(read, _)| read == path)
                    .map(|(_, at)| at.duration_since(*created))
            })
            .collect()
    }

    pub fn mixin_locations(&self) -> Vec<String> {
        self.state
            .lock()
            .unwrap()
            .mixins
            .iter()
            .map(|(_, location)| location.clone())
            .collect()
    }
}

async fn issue_token(Json(body): Json<serde_json::Value>) -> Response {
    let credentials = &body["auth"]["passwordCredentials"];
    let valid = credentials["username"] == USERNAME
        && credentials["password"] == PASSWORD
        && body["auth"]["tenantName"] == USERNAME;
    if !valid {
        return (StatusCode::UNAUTHORIZED, "invalid credentials").into_response();
    }
    Json(serde_json::json!({
        "access": {"token": {"id": TOKEN, "expires": "2099-01-01T00:00:00Z"}}
    }))
    .into_response()
}

async fn occi(State(state): State<Shared>, method: Method, uri: Uri, headers: HeaderMap) -> Response {
    if header(&headers, "x-auth-token") != TOKEN {
        return (StatusCode::UNAUTHORIZED, "missing or invalid token").into_response();
    }
    let origin = format!("http://{}", header(&headers, "host"));
    let path = uri.path().to_string();
    let mut state = state.lock().unwrap();

    match (method, uri.query()) {
        (Method::GET, _) if path == "/-/" => query_interface(&state),
        (Method::POST, _) if path == "/-/" => define_mixin(&mut state, &headers),
        (Method::POST, Some(query)) => match query.strip_prefix("action=") {
            Some(action) => trigger(&mut state, &path, action, &headers),
            None => StatusCode::BAD_REQUEST.into_response(),
        },
        (Method::POST, None) if path.ends_with('/') => create(&mut state, &origin, &path, &headers),
        (Method::GET, _) if path.ends_with('/') => list(&state, &origin, &path),
        (Method::GET, _) => retrieve(&mut state, &path),
        (Method::DELETE, _) => destroy(&mut state, &path),
        _ => StatusCode::METHOD_NOT_ALLOWED.into_response(),
    }
}

fn query_interface(state: &MockState) -> Response {
    let mut categories = vec![
        format!(r#"compute; scheme="{INFRASTRUCTURE}"; class="kind""#),
        format!(r#"storage; scheme="{INFRASTRUCTURE}"; class="kind""#),
        format!(r#"storagelink; scheme="{INFRASTRUCTURE}"; class="kind""#),
        format!(r#"stop; scheme="{COMPUTE_ACTION}"; class="action""#),
        format!(r#"start; scheme="{COMPUTE_ACTION}"; class="action""#),
    ];
    for (term, location) in &state.mixins {
        categories.push(format!(r#"{term}; class="mixin"; location="{location}""#));
    }
    with_headers(StatusCode::OK, [("category", categories.join(", "))])
}

fn define_mixin(state: &mut MockState, headers: &HeaderMap) -> Response {
    let category = header(headers, "category");
    let term = category.split(';').next().unwrap_or("").trim().to_string();
    let Some(location) = quoted_param(&category, "location") else {
        return (StatusCode::BAD_REQUEST, "mixin without location").into_response();
    };
    if term.is_empty() || !category.contains(r#"class="mixin""#) {
        return (StatusCode::BAD_REQUEST, "not a mixin").into_response();
    }
    state.mixins.push((term, location));
    StatusCode::OK.into_response()
}

fn create(state: &mut MockState, origin: &str, collection: &str, headers: &HeaderMap) -> Response {
    if let Some((failing, status)) = state.options.fail_create {
        if failing == collection {
            return (status, "backend exploded").into_response();
        }
    }

    let categories = tokens(headers, "category");
    let attributes = tokens(headers, "x-occi-attribute");
    let settle = state.options.settle_gets;

    let mut resource = Resource {
        collection: collection.to_string(),
        categories,
        attributes,
        state: None,
        pending: None,
    };

    let kind = match collection {
        "/compute/" if resource.has_kind("compute") => {
            resource.state = Some(("occi.compute.state", "inactive".into()));
            if !state.options.never_activate {
                resource.schedule(settle, "active");
            }
            "compute"
        }
        // Security rules are created through the compute collection.
        "/compute/" if resource.has_kind("rule") => "rule",
        "/storage/" if resource.has_kind("storage") => {
            resource.state = Some(("occi.storage.state", "offline".into()));
            resource.schedule(settle, "online");
            "storage"
        }
        "/storage/link/" if resource.has_kind("storagelink") => {
            for end in ["occi.core.source", "occi.core.target"] {
                let target = attribute_value(&resource.attributes, end)
                    .and_then(|url| url.strip_prefix(origin).map(str::to_string));
                match target {
                    Some(path) if state.resources.contains_key(&path) => {}
                    _ => {
                        return (StatusCode::BAD_REQUEST, format!("{end} does not name a resource"))
                            .into_response();
                    }
                }
            }
            state.link_attributes = resource.attributes.clone();
            "storagelink"
        }
        _ => return (StatusCode::BAD_REQUEST, "unsupported kind").into_response(),
    };

    state.next_id += 1;
    let path = format!("{}{}", collection, state.next_id);
    state.created.push((kind, path.clone(), Instant::now()));
    state.resources.insert(path.clone(), resource);
    with_headers(StatusCode::CREATED, [("location", format!("{origin}{path}"))])
}

fn list(state: &MockState, origin: &str, location: &str) -> Response {
    let mixin = state
        .mixins
        .iter()
        .find(|(_, loc)| loc == location)
        .map(|(term, _)| term.clone());

    let members: Vec<String> = state
        .resources
        .iter()
        .filter(|(_, r)| match &mixin {
            Some(term) => has_term(&r.categories, term),
            None => r.collection == location,
        })
        .map(|(path, _)| format!("{origin}{path}"))
        .collect();

    if members.is_empty() {
        return StatusCode::OK.into_response();
    }
    with_headers(StatusCode::OK, [("x-occi-location", members.join(", "))])
}

fn retrieve(state: &mut MockState, path: &str) -> Response {
    let Some(resource) = state.resources.get_mut(path) else {
        return (StatusCode::NOT_FOUND, "no such resource").into_response();
    };
    resource.observe();
    state.reads.push((path.to_string(), Instant::now()));

    let id = path.rsplit('/').next().unwrap_or("");
    let mut attributes = vec![format!(r#"occi.core.id="{id}""#)];
    if let Some((name, value)) = &resource.state {
        attributes.push(format!(r#"{name}="{value}""#));
    }
    attributes.extend(resource.attributes.iter().cloned());

    with_headers(
        StatusCode::OK,
        [
            ("category", resource.categories.join(", ")),
            ("x-occi-attribute", attributes.join(", ")),
        ],
    )
}

fn trigger(state: &mut MockState, path: &str, action: &str, headers: &HeaderMap) -> Response {
    let settle = state.options.settle_gets;
    let never_activate = state.options.never_activate;
    let stop_pending = state.options.stop_pending_gets;
    let Some(resource) = state.resources.get_mut(path) else {
        return (StatusCode::NOT_FOUND, "no such resource").into_response();
    };
    if !has_term(&tokens(headers, "category"), action) {
        return (StatusCode::BAD_REQUEST, "action category does not match query").into_response();
    }
    if !resource.has_kind("compute") {
        return (StatusCode::BAD_REQUEST, "actions apply to compute resources").into_response();
    }

    match action {
        "stop" if stop_pending > 0 => {
            if let Some((_, current)) = resource.state.as_mut() {
                *current = "pending".into();
            }
            resource.schedule(stop_pending + 1, "inactive");
        }
        "stop" => resource.schedule(settle, "inactive"),
        "start" => {
            if !resource.is_in("inactive") {
                return (StatusCode::CONFLICT, "start requires an inactive compute").into_response();
            }
            if !never_activate {
                resource.schedule(settle, "active");
            }
        }
        _ => {}
    }
    state.actions.push((path.to_string(), action.to_string()));
    StatusCode::OK.into_response()
}

fn destroy(state: &mut MockState, path: &str) -> Response {
    if state.options.ignore_deletes && state.resources.contains_key(path) {
        return StatusCode::OK.into_response();
    }
    match state.resources.remove(path) {
        Some(_) => StatusCode::OK.into_response(),
        None => (StatusCode::NOT_FOUND, "no such resource").into_response(),
    }
}

fn header(headers: &HeaderMap, name: &str) -> String {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string()
}

fn tokens(headers: &HeaderMap, name: &str) -> Vec<String> {
    let value = header(headers, name);
    if value.is_empty() {
        return Vec::new();
    }
    value.split(',').map(|t| t.trim().to_string()).collect()
}

fn has_term(categories: &[String], term: &str) -> bool {
    let prefix = format!("{term};");
    categories.iter().any(|c| c.starts_with(&prefix))
}

/// Unquoted value of `name="..."` among attribute tokens.
fn attribute_value<'a>(attributes: &'a [String], name: &str) -> Option<&'a str> {
    let prefix = format!("{name}=\"");
    attributes
        .iter()
        .find_map(|a| a.strip_prefix(&prefix))
        .and_then(|rest| rest.strip_suffix('"'))
}

/// Value of `; name="..."` in a category token.
fn quoted_param(category: &str, name: &str) -> Option<String> {
    let marker = format!("{name}=\"");
    let start = category.find(&marker)? + marker.len();
    let end = category[start..].find('"')? + start;
    Some(category[start..end].to_string())
}

fn with_headers<const N: usize>(status: StatusCode, headers: [(&'static str, String); N]) -> Response {
    let mut response = status.into_response();
    for (name, value) in headers {
        if let Ok(value) = HeaderValue::from_str(&value) {
            response.headers_mut().insert(name, value);
        }
    }
    response
}
