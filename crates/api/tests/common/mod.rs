#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use chefmatch_api::config::ServerConfig;
use chefmatch_api::router::build_app_router;
use chefmatch_api::state::AppState;
use chefmatch_core::category;
use chefmatch_core::ports::{Catalog, PortError, PreferenceStore, RecommendationStore};
use chefmatch_core::recommendation::{CatalogEntry, RecommendationSet};
use chefmatch_db::{PgCatalog, PgPreferenceStore, PgRecommendationStore};
use chefmatch_events::{
    BusError, Delivery, MemoryQueue, MessageQueue, PgQueue, PgQueueConfig, PreferencePublisher,
};
use chefmatch_pipeline::{RecommendationGenerator, RecommendationQuery};
use chefmatch_worker::WorkerConfig;
use http_body_util::BodyExt;
use sqlx::postgres::PgPoolOptions;
use sqlx::PgPool;
use tokio::sync::Mutex;
use tower::ServiceExt;

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        worker: WorkerConfig {
            queue: PgQueueConfig {
                poll_interval: Duration::from_millis(10),
                visibility_timeout: Duration::from_secs(30),
            },
            ..Default::default()
        },
    }
}

fn assemble(
    pool: PgPool,
    catalog: Arc<dyn Catalog>,
    preferences: Arc<dyn PreferenceStore>,
    store: Arc<dyn RecommendationStore>,
    queue: Arc<dyn MessageQueue>,
) -> Router {
    let config = test_config();
    let generator = Arc::new(RecommendationGenerator::new(
        Arc::clone(&catalog),
        Arc::clone(&store),
        config.pipeline(),
    ));
    let query = Arc::new(RecommendationQuery::new(
        generator,
        catalog,
        Arc::clone(&preferences),
        store,
        config.pipeline(),
    ));

    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
        query,
        preferences,
        publisher: PreferencePublisher::new(queue, config.worker.topic.clone()),
    };

    build_app_router(state, &config)
}

/// Build the full application router against a real database.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    assemble(
        pool.clone(),
        Arc::new(PgCatalog::new(pool.clone())),
        Arc::new(PgPreferenceStore::new(pool.clone())),
        Arc::new(PgRecommendationStore::new(pool.clone())),
        Arc::new(PgQueue::new(pool, config.worker.queue)),
    )
}

// ---------------------------------------------------------------------------
// In-memory collaborators
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCatalog {
    pub entries: Vec<CatalogEntry>,
    pub failing: AtomicBool,
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_by_category(&self, target: &str) -> Result<Vec<CatalogEntry>, PortError> {
        let all = self.list_all().await?;
        let target = category::normalize(target);
        Ok(all
            .into_iter()
            .filter(|e| category::matches_normalized(&e.category, &target))
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, PortError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("catalog down".into()));
        }
        Ok(self.entries.clone())
    }
}

#[derive(Default)]
pub struct FakePreferences {
    pub values: Mutex<HashMap<String, String>>,
    pub failing: AtomicBool,
}

#[async_trait]
impl PreferenceStore for FakePreferences {
    async fn current_preference(&self, user_id: &str) -> Result<Option<String>, PortError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("preferences down".into()));
        }
        Ok(self.values.lock().await.get(user_id).cloned())
    }

    async fn set_preference(&self, user_id: &str, category: &str) -> Result<(), PortError> {
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("preferences down".into()));
        }
        self.values
            .lock()
            .await
            .insert(user_id.to_string(), category.to_string());
        Ok(())
    }
}

#[derive(Default)]
pub struct FakeStore {
    pub sets: Mutex<HashMap<String, RecommendationSet>>,
}

#[async_trait]
impl RecommendationStore for FakeStore {
    async fn get(&self, user_id: &str) -> Result<Option<RecommendationSet>, PortError> {
        Ok(self.sets.lock().await.get(user_id).cloned())
    }

    async fn replace(&self, set: &RecommendationSet) -> Result<(), PortError> {
        self.sets
            .lock()
            .await
            .insert(set.user_id.clone(), set.clone());
        Ok(())
    }
}

/// A queue whose backend is always down.
pub struct DownQueue;

#[async_trait]
impl MessageQueue for DownQueue {
    async fn publish(&self, _topic: &str, _payload: &[u8]) -> Result<(), BusError> {
        Err(BusError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn receive(&self, _topic: &str) -> Result<Delivery, BusError> {
        Err(BusError::Backend(sqlx::Error::PoolTimedOut))
    }

    async fn ack(&self, delivery: &Delivery) -> Result<(), BusError> {
        Err(BusError::UnknownDelivery(delivery.id))
    }

    async fn nack(&self, delivery: &Delivery, _after: Duration, _reason: &str) -> Result<(), BusError> {
        Err(BusError::UnknownDelivery(delivery.id))
    }

    async fn dead_letter(&self, delivery: &Delivery, _reason: &str) -> Result<(), BusError> {
        Err(BusError::UnknownDelivery(delivery.id))
    }
}

pub fn entry(id: i64, name: &str, category: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        name: name.into(),
        category: category.into(),
        cooking_time_minutes: None,
    }
}

pub fn sample_catalog() -> Vec<CatalogEntry> {
    vec![
        entry(1, "Lasagna", "Italian"),
        entry(2, "Tacos al Pastor", "Mexican"),
        entry(3, "Risotto", "Italian"),
        entry(4, "Buddha Bowl", "Vegan"),
        entry(5, "Chana Masala", "Vegan"),
    ]
}

/// Router plus handles on its in-memory collaborators.
pub struct FakeApp {
    pub router: Router,
    pub catalog: Arc<FakeCatalog>,
    pub preferences: Arc<FakePreferences>,
    pub store: Arc<FakeStore>,
    pub queue: Arc<MemoryQueue>,
}

/// A pool that never connects; only the health endpoint would use it.
fn unused_pool() -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_millis(100))
        .connect_lazy("postgres://chefmatch@127.0.0.1:1/unused")
        .unwrap()
}

/// Build the application over in-memory collaborators and a `MemoryQueue`.
pub fn build_fake_app(catalog: Vec<CatalogEntry>) -> FakeApp {
    let catalog = Arc::new(FakeCatalog {
        entries: catalog,
        ..Default::default()
    });
    let preferences = Arc::new(FakePreferences::default());
    let store = Arc::new(FakeStore::default());
    let queue = Arc::new(MemoryQueue::new());

    let router = assemble(
        unused_pool(),
        catalog.clone(),
        preferences.clone(),
        store.clone(),
        queue.clone(),
    );

    FakeApp {
        router,
        catalog,
        preferences,
        store,
        queue,
    }
}

/// Build the application with a queue that rejects every publish.
pub fn build_app_with_down_queue(catalog: Vec<CatalogEntry>) -> (Router, Arc<FakePreferences>) {
    let preferences = Arc::new(FakePreferences::default());
    let router = assemble(
        unused_pool(),
        Arc::new(FakeCatalog {
            entries: catalog,
            ..Default::default()
        }),
        preferences.clone(),
        Arc::new(FakeStore::default()),
        Arc::new(DownQueue),
    );
    (router, preferences)
}

// ---------------------------------------------------------------------------
// Request helpers
// ---------------------------------------------------------------------------

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    let request = Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn post_json(app: Router, uri: &str, json: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_vec(&json).unwrap()))
        .unwrap();
    app.oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}
