// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Template persistence.
//!
//! [`TemplateStore`] is the global collection (list, upsert by id, delete by
//! id). [`TemplateLibrary`] is the editor's view of it: changes apply to the
//! in-memory list and the local cache immediately, then sync to the store on
//! a single worker thread that runs jobs in the order they were made. A
//! failed sync keeps the change locally and raises a notice instead of
//! losing it.

use crate::error::{EditorError, Result};
use crate::models::template::{Template, TemplateId};
use crate::notice::Notice;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

/// The global template collection.
pub trait TemplateStore: Send + Sync {
    /// All templates. A missing or unreadable backing store is an empty
    /// collection, not an error.
    fn list(&self) -> Result<Vec<Template>>;

    /// Replace the template with the same id, or append it. Returns the
    /// updated collection.
    fn upsert(&self, template: &Template) -> Result<Vec<Template>>;

    /// Remove the template with `id` if present. Returns the updated collection.
    fn delete(&self, id: &TemplateId) -> Result<Vec<Template>>;
}

/// Store backed by a pretty-printed JSON array on disk.
pub struct FileTemplateStore {
    path: PathBuf,
    // Serializes read-modify-write cycles from concurrent sync workers
    lock: Mutex<()>,
}

impl FileTemplateStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            lock: Mutex::new(()),
        }
    }

    fn read(&self) -> Vec<Template> {
        read_templates(&self.path)
    }

    fn write(&self, templates: &[Template]) -> Result<()> {
        write_templates(&self.path, templates)
    }

    fn guard(&self) -> Result<std::sync::MutexGuard<'_, ()>> {
        self.lock
            .lock()
            .map_err(|_| EditorError::store("template store lock poisoned"))
    }
}

impl TemplateStore for FileTemplateStore {
    fn list(&self) -> Result<Vec<Template>> {
        let _guard = self.guard()?;
        Ok(self.read())
    }

    fn upsert(&self, template: &Template) -> Result<Vec<Template>> {
        let _guard = self.guard()?;
        let mut templates = self.read();
        match templates.iter_mut().find(|t| t.id == template.id) {
            Some(existing) => *existing = template.clone(),
            None => templates.push(template.clone()),
        }
        self.write(&templates)?;
        log::info!("Template {:?} saved, total: {}", template.name, templates.len());
        Ok(templates)
    }

    fn delete(&self, id: &TemplateId) -> Result<Vec<Template>> {
        let _guard = self.guard()?;
        let mut templates = self.read();
        templates.retain(|t| &t.id != id);
        self.write(&templates)?;
        log::info!("Template {id} deleted, total: {}", templates.len());
        Ok(templates)
    }
}

/// Read a JSON template list. Missing or corrupt files read as empty.
pub fn read_templates(path: &Path) -> Vec<Template> {
    let data = match std::fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) => {
            log::info!("No templates at {}: {}", path.display(), e);
            return Vec::new();
        }
    };
    serde_json::from_str(&data).unwrap_or_else(|e| {
        log::warn!("Ignoring corrupt template file {}: {}", path.display(), e);
        Vec::new()
    })
}

/// Write a JSON template list, creating parent directories.
pub fn write_templates(path: &Path, templates: &[Template]) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(path, serde_json::to_string_pretty(templates)?)?;
    Ok(())
}

/// A change made locally, replayed on top of store results until synced.
#[derive(Debug, Clone)]
enum LocalChange {
    Refresh,
    Upsert(Template),
    Delete(TemplateId),
}

impl LocalChange {
    fn template_id(&self) -> Option<&TemplateId> {
        match self {
            LocalChange::Refresh => None,
            LocalChange::Upsert(t) => Some(&t.id),
            LocalChange::Delete(id) => Some(id),
        }
    }

    fn apply(&self, templates: &mut Vec<Template>) {
        match self {
            LocalChange::Refresh => {}
            LocalChange::Upsert(template) => match templates.iter_mut().find(|t| t.id == template.id) {
                Some(existing) => *existing = template.clone(),
                None => templates.push(template.clone()),
            },
            LocalChange::Delete(id) => templates.retain(|t| &t.id != id),
        }
    }
}

struct SyncJob {
    seq: u64,
    change: LocalChange,
}

struct SyncCompleted {
    seq: u64,
    result: Result<Vec<Template>>,
}

/// Run store jobs one at a time until the library hangs up.
fn run_sync_worker(store: Arc<dyn TemplateStore>, jobs: Receiver<SyncJob>, results: Sender<SyncCompleted>) {
    for SyncJob { seq, change } in jobs {
        let result = match &change {
            LocalChange::Refresh => store.list(),
            LocalChange::Upsert(template) => store.upsert(template),
            LocalChange::Delete(id) => store.delete(id),
        };
        if results.send(SyncCompleted { seq, result }).is_err() {
            break;
        }
    }
    log::debug!("Template sync worker stopped");
}

/// The editor's template list, synced with a [`TemplateStore`].
pub struct TemplateLibrary {
    templates: Vec<Template>,
    cache_path: Option<PathBuf>,
    jobs: Sender<SyncJob>,
    receiver: Receiver<SyncCompleted>,
    next_seq: u64,
    in_flight: BTreeMap<u64, LocalChange>,
    unsynced: Vec<LocalChange>,
}

impl TemplateLibrary {
    /// Create a library, seeding the list from the local cache.
    pub fn new(store: Arc<dyn TemplateStore>, cache_path: Option<PathBuf>) -> Self {
        let templates = cache_path.as_deref().map(read_templates).unwrap_or_default();
        let (jobs, job_receiver) = channel();
        let (sender, receiver) = channel();
        std::thread::spawn(move || run_sync_worker(store, job_receiver, sender));
        Self {
            templates,
            cache_path,
            jobs,
            receiver,
            next_seq: 0,
            in_flight: BTreeMap::new(),
            unsynced: Vec::new(),
        }
    }

    pub fn templates(&self) -> &[Template] {
        &self.templates
    }

    pub fn get(&self, id: &TemplateId) -> Option<&Template> {
        self.templates.iter().find(|t| &t.id == id)
    }

    /// Whether any sync is still running.
    pub fn is_syncing(&self) -> bool {
        !self.in_flight.is_empty()
    }

    /// Fetch the global collection.
    pub fn refresh(&mut self) {
        self.dispatch(LocalChange::Refresh);
    }

    /// Insert or update a template by id.
    pub fn save(&mut self, template: Template) {
        let change = LocalChange::Upsert(template);
        change.apply(&mut self.templates);
        self.write_cache();
        self.dispatch(change);
    }

    /// Delete a template by id. Returns whether it was present locally.
    pub fn delete(&mut self, id: &TemplateId) -> bool {
        let present = self.get(id).is_some();
        let change = LocalChange::Delete(id.clone());
        change.apply(&mut self.templates);
        self.write_cache();
        self.dispatch(change);
        present
    }

    fn dispatch(&mut self, change: LocalChange) {
        self.next_seq += 1;
        let seq = self.next_seq;
        let job = SyncJob { seq, change: change.clone() };
        if self.jobs.send(job).is_err() {
            log::error!("Template sync worker is gone; keeping change locally");
            if !matches!(change, LocalChange::Refresh) {
                self.unsynced.push(change);
            }
            return;
        }
        self.in_flight.insert(seq, change);
    }

    /// Apply finished syncs. Returns notices for the operator.
    pub fn poll(&mut self) -> Vec<Notice> {
        let mut notices = Vec::new();
        while let Ok(done) = self.receiver.try_recv() {
            notices.extend(self.complete(done));
        }
        notices
    }

    /// Block until every in-flight sync finished or `timeout` elapsed.
    pub fn wait_idle(&mut self, timeout: Duration) -> Vec<Notice> {
        let deadline = Instant::now() + timeout;
        let mut notices = Vec::new();
        while self.is_syncing() {
            let remaining = deadline.saturating_duration_since(Instant::now());
            match self.receiver.recv_timeout(remaining) {
                Ok(done) => notices.extend(self.complete(done)),
                Err(_) => break,
            }
        }
        notices
    }

    fn complete(&mut self, done: SyncCompleted) -> Option<Notice> {
        let change = self.in_flight.remove(&done.seq)?;
        match done.result {
            Ok(list) => {
                if let Some(id) = change.template_id() {
                    self.unsynced.retain(|c| c.template_id() != Some(id));
                }
                // The list reflects every job up to this one; replay the rest
                let mut templates = list;
                let newer = self.in_flight.range(done.seq + 1..).map(|(_, c)| c);
                for pending in self.unsynced.iter().chain(newer) {
                    pending.apply(&mut templates);
                }
                self.templates = templates;
                self.write_cache();
                log::info!("Template list synced ({} templates)", self.templates.len());
                None
            }
            Err(e) => {
                log::error!("Template sync failed: {e}");
                let message = match &change {
                    LocalChange::Refresh => "Could not fetch global templates; showing the local copy.".to_string(),
                    _ => "Global sync failed; the change is kept locally.".to_string(),
                };
                if !matches!(change, LocalChange::Refresh) {
                    self.unsynced.push(change);
                }
                Some(Notice::warning(message))
            }
        }
    }

    fn write_cache(&self) {
        if let Some(path) = &self.cache_path {
            if let Err(e) = write_templates(path, &self.templates) {
                log::warn!("Failed to write template cache {}: {}", path.display(), e);
            }
        }
    }
}
