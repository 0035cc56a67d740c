use super::{TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY};
use axum::{
    Router,
    body::{Body, Bytes},
    http::{HeaderMap, Request, StatusCode},
};
use http_body_util::BodyExt;
use report_gateway::{
    AppState, Credentials, DelegationSettings, GatewayError, InMemoryStore, LocatorResolver,
    ObjectStore, Signer, Strategy, build_strategy, create_app,
};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Gateway router wired to an in-memory store
///
/// Uses the same create_app() as the binary; requests are driven through
/// the router directly instead of a socket.
pub struct TestApp {
    pub router: Router,
    pub store: InMemoryStore,
    pub credentials: Credentials,
}

/// Fully buffered response
pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Result<Bytes, String>,
}

impl TestResponse {
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    pub fn body_bytes(&self) -> &[u8] {
        self.body.as_deref().expect("body should be readable")
    }
}

impl TestApp {
    /// Single-file deployment: every identifier resolves to `location`
    pub fn single(strategy: Strategy, location: &str) -> Self {
        let resolver = LocatorResolver::single(location).unwrap();
        Self::with_resolver(strategy, resolver)
    }

    /// Catalog deployment: identifiers select locations
    pub fn catalog(strategy: Strategy, reports: &[(&str, &str)]) -> Self {
        Self::try_catalog(strategy, reports).unwrap()
    }

    /// Catalog deployment with the same startup checks as the binary
    pub fn try_catalog(
        strategy: Strategy,
        reports: &[(&str, &str)],
    ) -> Result<Self, GatewayError> {
        let catalog: HashMap<String, String> = reports
            .iter()
            .map(|(id, location)| (id.to_string(), location.to_string()))
            .collect();
        let resolver = LocatorResolver::new(&catalog, None)?;
        resolver.check_strategy(strategy)?;
        Ok(Self::with_resolver(strategy, resolver))
    }

    fn with_resolver(strategy: Strategy, resolver: LocatorResolver) -> Self {
        let credentials = Credentials::new(TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY);
        let store = InMemoryStore::new(credentials.clone());
        let delegate = build_strategy(
            strategy,
            Signer::new(credentials.clone()),
            Arc::new(store.clone()),
            DelegationSettings::default(),
        );
        Self::with_parts(AppState::new(resolver, delegate), store, credentials)
    }

    /// Router over a custom store (failure injection)
    pub fn with_store(
        strategy: Strategy,
        location: &str,
        store: Arc<dyn ObjectStore>,
    ) -> Self {
        let credentials = Credentials::new(TEST_ACCESS_KEY_ID, TEST_SECRET_ACCESS_KEY);
        let delegate = build_strategy(
            strategy,
            Signer::new(credentials.clone()),
            store,
            DelegationSettings::default(),
        );
        let resolver = LocatorResolver::single(location).unwrap();
        Self::with_parts(
            AppState::new(resolver, delegate),
            InMemoryStore::new(credentials.clone()),
            credentials,
        )
    }

    fn with_parts(state: AppState, store: InMemoryStore, credentials: Credentials) -> Self {
        Self {
            router: create_app(state),
            store,
            credentials,
        }
    }

    pub async fn put(&self, location: &str, data: &'static [u8]) {
        let locator = report_gateway::parse_location(location).unwrap();
        self.store
            .put_object(&locator, Bytes::from_static(data), None)
            .await;
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        let response = self.router.clone().oneshot(request).await.unwrap();

        let status = response.status();
        let headers = response.headers().clone();
        let body = response
            .into_body()
            .collect()
            .await
            .map(|collected| collected.to_bytes())
            .map_err(|e| e.to_string());

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
