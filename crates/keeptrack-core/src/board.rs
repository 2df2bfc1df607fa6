//! Board state controller
//!
//! Owns the canonical in-memory project list for the board view. All
//! mutation goes through here: loading (cache-first), optimistic application
//! of reorder plans, per-project commit/rollback against the remote gateway,
//! and the per-column grouping the rendering layer reads.

use std::collections::HashMap;
use std::sync::Arc;

use futures_util::future::join_all;
use tracing::{debug, warn};

use crate::cache::{KeyValueStore, ProjectCache};
use crate::error::Result;
use crate::gateway::ProjectGateway;
use crate::project::{Project, ProjectStatus};
use crate::reorder::{MoveEvent, plan_move};

/// How the current working set was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadState {
    #[default]
    NotLoaded,
    /// Served from the local cache; the server was not consulted.
    Cached,
    /// Fetched from the server (and mirrored into the cache).
    Fetched,
}

/// Stateful controller mediating between the reorder engine, the remote
/// gateway, and the local cache.
///
/// Single-owner by design: the rendering layer holds exactly one controller
/// per board view and reads [`BoardController::by_column`] after every
/// command.
pub struct BoardController<S: KeyValueStore> {
    gateway: Arc<dyn ProjectGateway>,
    cache: ProjectCache<S>,
    projects: Vec<Project>,
    load_state: LoadState,
    last_error: Option<String>,
}

impl<S: KeyValueStore> BoardController<S> {
    pub fn new(gateway: Arc<dyn ProjectGateway>, cache: ProjectCache<S>) -> Self {
        Self {
            gateway,
            cache,
            projects: Vec::new(),
            load_state: LoadState::NotLoaded,
            last_error: None,
        }
    }

    /// Load the working set, cache-first.
    ///
    /// A populated cache wins over the network regardless of staleness. On a
    /// cache miss the collection is fetched, and the cache is seeded on the
    /// first successful fetch. A fetch failure leaves the working set empty
    /// and surfaces the error.
    pub async fn load(&mut self) -> Result<&[Project]> {
        if let Some(cached) = self.cache.load() {
            debug!(count = cached.len(), "loading projects from cache");
            self.projects = cached;
            self.load_state = LoadState::Cached;
            return Ok(&self.projects);
        }

        match self.gateway.fetch_all().await {
            Ok(projects) => {
                debug!(count = projects.len(), "loaded projects from server");
                self.projects = projects;
                if !self.cache.is_seeded() {
                    self.cache.save(&self.projects);
                    self.cache.mark_seeded();
                }
                self.load_state = LoadState::Fetched;
                Ok(&self.projects)
            }
            Err(e) => {
                self.last_error = Some(e.to_string());
                self.projects.clear();
                Err(e)
            }
        }
    }

    /// Apply a drag-and-drop move.
    ///
    /// The engine's plan is written to the working set immediately, then each
    /// touched project is persisted independently; a failed update rolls back
    /// only that project. A move referencing an id outside the working set is
    /// a rendering-layer inconsistency: it is logged and ignored without
    /// surfacing an error.
    pub async fn apply_move(&mut self, event: &MoveEvent) {
        let plan = match plan_move(&self.projects, event) {
            Ok(plan) => plan,
            Err(e) => {
                warn!(error = %e, "move referenced a project outside the working set");
                return;
            }
        };

        // Cancelled drop or dropped in place
        if plan.is_empty() {
            return;
        }

        self.settle_updates(plan).await;
    }

    /// Persist a single edited project with the same optimistic
    /// commit/rollback rules as a move.
    pub async fn save_project(&mut self, project: Project) {
        if !self.projects.iter().any(|p| p.id == project.id) {
            warn!(id = project.id, "save for a project outside the working set ignored");
            return;
        }
        self.settle_updates(vec![project]).await;
    }

    /// Optimistically apply `plan`, push every entry to the gateway
    /// concurrently, then commit or roll back each project as its own update
    /// settles.
    async fn settle_updates(&mut self, plan: Vec<Project>) {
        let mut snapshots: HashMap<i64, Project> = HashMap::new();
        for planned in &plan {
            if let Some(prev) = self.projects.iter().find(|p| p.id == planned.id) {
                snapshots.insert(planned.id, prev.clone());
            }
            self.replace_entry(planned.clone());
        }

        let updates = plan.into_iter().map(|planned| {
            let gateway = Arc::clone(&self.gateway);
            async move {
                let outcome = gateway.update(&planned).await;
                (planned.id, outcome)
            }
        });
        let results = join_all(updates).await;

        for (id, outcome) in results {
            match outcome {
                Ok(server_record) => {
                    // Server is authoritative for the stored shape
                    self.replace_entry(server_record);
                }
                Err(e) => {
                    warn!(id, error = %e, "update failed, rolling back project");
                    self.last_error = Some(e.to_string());
                    if let Some(snapshot) = snapshots.remove(&id) {
                        self.replace_entry(snapshot);
                    }
                }
            }
        }

        // Mirror the settled working set into the cache; failure there is
        // already absorbed and logged by the cache layer.
        self.cache.save(&self.projects);
    }

    fn replace_entry(&mut self, project: Project) {
        if let Some(slot) = self.projects.iter_mut().find(|p| p.id == project.id) {
            *slot = project;
        }
    }

    /// The raw working set.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    pub fn load_state(&self) -> LoadState {
        self.load_state
    }

    /// Message of the most recent surfaced failure, for the error banner.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    /// The board as the rendering layer consumes it: every column in board
    /// order, its projects sorted ascending by `order`. Recomputed on every
    /// read from the working set.
    pub fn by_column(&self) -> Vec<(ProjectStatus, Vec<Project>)> {
        ProjectStatus::ALL
            .into_iter()
            .map(|status| {
                let mut column: Vec<Project> = self
                    .projects
                    .iter()
                    .filter(|p| p.status == status)
                    .cloned()
                    .collect();
                column.sort_by_key(|p| p.order);
                (status, column)
            })
            .collect()
    }
}
