//! In-memory fakes of the collaborator ports, plus a harness wiring them
//! into a generator, query service and consumer.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use chefmatch_core::category;
use chefmatch_core::ports::{Catalog, PortError, PreferenceStore, RecommendationStore};
use chefmatch_core::recommendation::{CatalogEntry, RecommendationSet};
use chefmatch_events::{MemoryQueue, MessageQueue};
use chefmatch_pipeline::{
    EventConsumer, PipelineConfig, RecommendationGenerator, RecommendationQuery,
};
use tokio::sync::Mutex;

pub const TOPIC: &str = "user_updates";

// ---------------------------------------------------------------------------
// Catalog
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeCatalog {
    entries: Mutex<Vec<CatalogEntry>>,
    failing: AtomicBool,
    delay: Mutex<Option<Duration>>,
    pub calls: AtomicUsize,
}

impl FakeCatalog {
    pub fn with_entries(entries: Vec<CatalogEntry>) -> Self {
        Self {
            entries: Mutex::new(entries),
            ..Default::default()
        }
    }

    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }

    pub async fn set_delay(&self, delay: Option<Duration>) {
        *self.delay.lock().await = delay;
    }

    async fn check(&self) -> Result<(), PortError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = *self.delay.lock().await {
            tokio::time::sleep(delay).await;
        }
        if self.failing.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("catalog down".into()));
        }
        Ok(())
    }
}

#[async_trait]
impl Catalog for FakeCatalog {
    async fn list_by_category(&self, category: &str) -> Result<Vec<CatalogEntry>, PortError> {
        self.check().await?;
        let target = category::normalize(category);
        Ok(self
            .entries
            .lock()
            .await
            .iter()
            .filter(|e| category::matches_normalized(&e.category, &target))
            .cloned()
            .collect())
    }

    async fn list_all(&self) -> Result<Vec<CatalogEntry>, PortError> {
        self.check().await?;
        Ok(self.entries.lock().await.clone())
    }
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakePreferences {
    values: Mutex<HashMap<String, String>>,
    failing: AtomicBool,
}

impl FakePreferences {
    pub fn set_failing(&self, failing: bool) {
        self.failing.store(failing, Ordering::SeqCst);
    }
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

// ---------------------------------------------------------------------------
// Recommendation store
// ---------------------------------------------------------------------------

#[derive(Default)]
pub struct FakeStore {
    sets: Mutex<HashMap<String, RecommendationSet>>,
    failing_writes: AtomicBool,
    failing_reads: AtomicBool,
    pub writes: AtomicUsize,
}

impl FakeStore {
    pub fn set_failing_writes(&self, failing: bool) {
        self.failing_writes.store(failing, Ordering::SeqCst);
    }

    pub fn set_failing_reads(&self, failing: bool) {
        self.failing_reads.store(failing, Ordering::SeqCst);
    }

    /// Store a set directly, bypassing the write counter and failure toggle.
    pub async fn seed(&self, set: RecommendationSet) {
        self.sets.lock().await.insert(set.user_id.clone(), set);
    }

    pub async fn snapshot(&self, user_id: &str) -> Option<RecommendationSet> {
        self.sets.lock().await.get(user_id).cloned()
    }

    pub async fn len(&self) -> usize {
        self.sets.lock().await.len()
    }
}

#[async_trait]
impl RecommendationStore for FakeStore {
    async fn get(&self, user_id: &str) -> Result<Option<RecommendationSet>, PortError> {
        if self.failing_reads.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("store down".into()));
        }
        Ok(self.sets.lock().await.get(user_id).cloned())
    }

    async fn replace(&self, set: &RecommendationSet) -> Result<(), PortError> {
        if self.failing_writes.load(Ordering::SeqCst) {
            return Err(PortError::Unavailable("store down".into()));
        }
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.sets
            .lock()
            .await
            .insert(set.user_id.clone(), set.clone());
        Ok(())
    }
}

// ---------------------------------------------------------------------------
// Catalog fixtures
// ---------------------------------------------------------------------------

pub fn entry(id: i64, name: &str, category: &str) -> CatalogEntry {
    CatalogEntry {
        id,
        name: name.into(),
        category: category.into(),
        cooking_time_minutes: Some(30),
    }
}

/// A small catalog spanning three categories.
pub fn sample_catalog() -> Vec<CatalogEntry> {
    vec![
        entry(1, "Lasagna", "Italian"),
        entry(2, "Tacos al Pastor", "Mexican"),
        entry(3, "Risotto", "Italian"),
        entry(4, "Buddha Bowl", "Vegan"),
        entry(5, "Enchiladas", "Mexican"),
        entry(6, "Margherita Pizza", "italian"),
        entry(7, "Chana Masala", "Vegan"),
    ]
}

pub fn names_in_category(catalog: &[CatalogEntry], target: &str) -> Vec<String> {
    let target = category::normalize(target);
    catalog
        .iter()
        .filter(|e| category::matches_normalized(&e.category, &target))
        .map(|e| e.name.clone())
        .collect()
}

// ---------------------------------------------------------------------------
// Harness
// ---------------------------------------------------------------------------

pub struct Harness {
    pub catalog: Arc<FakeCatalog>,
    pub preferences: Arc<FakePreferences>,
    pub store: Arc<FakeStore>,
    pub queue: Arc<MemoryQueue>,
    pub generator: Arc<RecommendationGenerator>,
    pub query: RecommendationQuery,
    pub consumer: EventConsumer,
}

impl Harness {
    pub fn new(catalog: Vec<CatalogEntry>) -> Self {
        Self::with_config(catalog, PipelineConfig::default())
    }

    pub fn with_config(catalog: Vec<CatalogEntry>, config: PipelineConfig) -> Self {
        let catalog = Arc::new(FakeCatalog::with_entries(catalog));
        let preferences = Arc::new(FakePreferences::default());
        let store = Arc::new(FakeStore::default());
        let queue = Arc::new(MemoryQueue::new());

        let generator = Arc::new(RecommendationGenerator::new(
            catalog.clone(),
            store.clone(),
            &config,
        ));
        let query = RecommendationQuery::new(
            generator.clone(),
            catalog.clone(),
            preferences.clone(),
            store.clone(),
            &config,
        );
        let consumer = EventConsumer::new(
            queue.clone() as Arc<dyn MessageQueue>,
            generator.clone(),
            TOPIC,
            &config,
        );

        Self {
            catalog,
            preferences,
            store,
            queue,
            generator,
            query,
            consumer,
        }
    }
}
