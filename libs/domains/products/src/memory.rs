//! In-memory storage backend for local development and tests.
//!
//! [`InMemoryProductStore`] holds the committed rows. Each unit of work gets
//! an [`InMemorySession`] that records staged changes and applies them to the
//! store all at once on commit. Reads through a session see the committed
//! rows overlaid with that session's own staged changes.

use async_trait::async_trait;
use database::{DatabaseError, DatabaseResult, Session};
use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicI32, Ordering};
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, warn};
use validator::Validate;

use crate::models::{CreateProduct, Product};
use crate::repository::ProductRepository;

/// Committed product rows, shared by every session of the backend.
#[derive(Clone, Debug)]
pub struct InMemoryProductStore {
    rows: Arc<RwLock<BTreeMap<i32, Product>>>,
    next_id: Arc<AtomicI32>,
}

impl InMemoryProductStore {
    pub fn new() -> Self {
        Self {
            rows: Arc::new(RwLock::new(BTreeMap::new())),
            next_id: Arc::new(AtomicI32::new(1)),
        }
    }

    /// Committed rows ordered by id.
    pub async fn products(&self) -> Vec<Product> {
        self.rows.read().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.rows.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.rows.read().await.is_empty()
    }

    // Like a serial column, ids handed out to changes that never commit are
    // not reused.
    fn allocate_id(&self) -> i32 {
        self.next_id.fetch_add(1, Ordering::Relaxed)
    }
}

impl Default for InMemoryProductStore {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Clone)]
enum Change {
    Insert(Product),
    Update(Product),
    Delete(i32),
}

impl Change {
    fn id(&self) -> i32 {
        match self {
            Change::Insert(p) | Change::Update(p) => p.id,
            Change::Delete(id) => *id,
        }
    }

    /// Apply to `rows`, failing when the target row is in the wrong state.
    fn apply(&self, rows: &mut BTreeMap<i32, Product>) -> Result<(), String> {
        match self {
            Change::Insert(product) => {
                if rows.contains_key(&product.id) {
                    return Err(format!("product {} already exists", product.id));
                }
                product
                    .validate()
                    .map_err(|e| format!("product {} violates constraints: {}", product.id, e))?;
                rows.insert(product.id, product.clone());
            }
            Change::Update(product) => {
                let row = rows
                    .get_mut(&product.id)
                    .ok_or_else(|| format!("product {} does not exist", product.id))?;
                product
                    .validate()
                    .map_err(|e| format!("product {} violates constraints: {}", product.id, e))?;
                *row = product.clone();
            }
            Change::Delete(id) => {
                rows.remove(id)
                    .ok_or_else(|| format!("product {} does not exist", id))?;
            }
        }
        Ok(())
    }

    /// Apply to a read view; staged writes against missing rows are ignored
    /// there and rejected at commit.
    fn overlay(&self, rows: &mut BTreeMap<i32, Product>) {
        match self {
            Change::Insert(product) => {
                rows.insert(product.id, product.clone());
            }
            Change::Update(product) => {
                if let Some(row) = rows.get_mut(&product.id) {
                    *row = product.clone();
                }
            }
            Change::Delete(id) => {
                rows.remove(id);
            }
        }
    }
}

/// Staged change set of one unit of work against an [`InMemoryProductStore`].
pub struct InMemorySession {
    store: InMemoryProductStore,
    staged: Mutex<Vec<Change>>,
    released: AtomicBool,
}

impl InMemorySession {
    pub fn new(store: InMemoryProductStore) -> Self {
        Self {
            store,
            staged: Mutex::new(Vec::new()),
            released: AtomicBool::new(false),
        }
    }

    pub async fn staged_len(&self) -> usize {
        self.staged.lock().await.len()
    }

    fn ensure_active(&self) -> DatabaseResult<()> {
        if self.is_released() {
            Err(DatabaseError::SessionReleased)
        } else {
            Ok(())
        }
    }

    async fn stage(&self, change: Change) -> DatabaseResult<()> {
        self.ensure_active()?;
        debug!(product_id = change.id(), "Staged in-memory change");
        self.staged.lock().await.push(change);
        Ok(())
    }

    /// Committed rows with this session's staged changes applied on top.
    async fn view(&self) -> DatabaseResult<BTreeMap<i32, Product>> {
        self.ensure_active()?;
        let staged = self.staged.lock().await;
        let mut rows = self.store.rows.read().await.clone();
        for change in staged.iter() {
            change.overlay(&mut rows);
        }
        Ok(rows)
    }
}

#[async_trait]
impl Session for InMemorySession {
    /// Validates the whole change set against a copy of the committed rows
    /// and swaps it in only if every change applies. A rejected change set
    /// is discarded.
    async fn commit(&self) -> DatabaseResult<()> {
        self.ensure_active()?;

        let changes = std::mem::take(&mut *self.staged.lock().await);
        if changes.is_empty() {
            return Ok(());
        }

        let mut rows = self.store.rows.write().await;
        let mut next = rows.clone();
        for change in &changes {
            change.apply(&mut next).map_err(DatabaseError::Rejected)?;
        }
        *rows = next;

        debug!(changes = changes.len(), "Committed in-memory change set");
        Ok(())
    }

    fn release(&self) {
        if self.released.swap(true, Ordering::AcqRel) {
            return;
        }

        match self.staged.try_lock() {
            Ok(mut staged) => {
                if !staged.is_empty() {
                    debug!(discarded = staged.len(), "Discarded uncommitted in-memory changes");
                    staged.clear();
                }
            }
            Err(_) => warn!("Session released while a change was being staged"),
        }
    }

    fn is_released(&self) -> bool {
        self.released.load(Ordering::Acquire)
    }
}

/// Product repository over an [`InMemorySession`].
pub struct InMemoryProductRepository {
    session: Arc<InMemorySession>,
}

impl InMemoryProductRepository {
    pub fn new(session: Arc<InMemorySession>) -> Self {
        Self { session }
    }
}

#[async_trait]
impl ProductRepository for InMemoryProductRepository {
    async fn get_all(&self) -> DatabaseResult<Vec<Product>> {
        Ok(self.session.view().await?.into_values().collect())
    }

    async fn get_by_id(&self, id: i32) -> DatabaseResult<Option<Product>> {
        Ok(self.session.view().await?.remove(&id))
    }

    async fn add(&self, input: CreateProduct) -> DatabaseResult<Product> {
        self.session.ensure_active()?;
        let product = Product::from_create(self.session.store.allocate_id(), input);
        self.session.stage(Change::Insert(product.clone())).await?;
        Ok(product)
    }

    async fn update(&self, product: Product) -> DatabaseResult<Product> {
        let product = product.with_fixed_price();
        self.session.stage(Change::Update(product.clone())).await?;
        Ok(product)
    }

    async fn delete(&self, product: Product) -> DatabaseResult<()> {
        self.session.stage(Change::Delete(product.id)).await
    }
}
