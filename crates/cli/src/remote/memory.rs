// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! In-process backend with the same access rules as the hosted service.
//!
//! One [`MemoryBackend`] holds the shared table and the live subscriptions.
//! Each [`MemoryStore`] is a client session against it: it sees and deletes
//! only its owner's rows, may only insert rows it owns, and receives change
//! events only for those rows. Stores also count calls per [`Operation`] and
//! can be told to fail or stall an operation, which is how the sync core is
//! exercised against partial failures and out-of-order replies.

use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Duration, Utc};
use serde_json::Value;
use smark_core::{
    Bookmark, ChangeEvent, ChannelSpec, Direction, Filter, Identity, Query, Row, UserId,
    OWNER_COLUMN,
};
use tokio::sync::{mpsc, Semaphore};

use super::{
    BoxFuture, ChangeStream, FeedEvent, RemoteError, RemoteResult, RemoteStore,
    SubscriptionHandle, FEED_CAPACITY,
};

/// Store operations that can be counted, failed, or stalled.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operation {
    Identity,
    Query,
    Insert,
    Delete,
    Subscribe,
    Unsubscribe,
    SignOut,
}

struct StoredRow {
    row: Row,
    owner: UserId,
    created_at: DateTime<Utc>,
}

struct Subscriber {
    id: u64,
    owner: UserId,
    spec: ChannelSpec,
    tx: mpsc::Sender<FeedEvent>,
}

#[derive(Default)]
struct Shared {
    rows: Vec<StoredRow>,
    last_created: Option<DateTime<Utc>>,
    subscribers: Vec<Subscriber>,
    next_subscription: u64,
}

impl Shared {
    /// Strictly increasing creation time, even within one clock tick.
    fn next_created_at(&mut self) -> DateTime<Utc> {
        let now = Utc::now();
        let created = match self.last_created {
            Some(last) if now <= last => last + Duration::microseconds(1),
            _ => now,
        };
        self.last_created = Some(created);
        created
    }

    fn publish(&mut self, event: &ChangeEvent) {
        let Some(owner) = event.owner() else {
            return;
        };
        self.subscribers.retain(|sub| !sub.tx.is_closed());
        for sub in &self.subscribers {
            if sub.owner != owner || !sub.spec.matches(event) {
                continue;
            }
            if let Err(mpsc::error::TrySendError::Full(_)) =
                sub.tx.try_send(FeedEvent::Change(event.clone()))
            {
                tracing::debug!(subscription = sub.id, "feed full, dropping change event");
            }
        }
    }
}

/// Shared table and subscription registry.
#[derive(Clone, Default)]
pub struct MemoryBackend {
    shared: Arc<Mutex<Shared>>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Opens a client session. `None` is an anonymous client.
    pub fn client(&self, identity: Option<Identity>) -> MemoryStore {
        MemoryStore {
            backend: self.clone(),
            session: Mutex::new(identity),
            calls: Mutex::new(HashMap::new()),
            failures: Mutex::new(HashMap::new()),
            gates: Mutex::new(HashMap::new()),
        }
    }

    /// Inserts a row directly, bypassing access rules, and notifies subscribers.
    ///
    /// Returns the stored bookmark with its assigned id and creation time.
    pub fn seed(&self, owner: &UserId, title: &str, url: &str) -> Bookmark {
        let mut shared = self.lock();
        let bookmark = Bookmark {
            id: uuid::Uuid::new_v4().to_string(),
            title: title.to_string(),
            url: url.to_string(),
            created_at: shared.next_created_at(),
            owner_id: owner.clone(),
        };
        let row = stored_row(&bookmark);
        let event = ChangeEvent::insert(smark_core::BOOKMARKS, row.row.clone());
        shared.rows.push(row);
        shared.publish(&event);
        bookmark
    }

    /// Stores `row` verbatim under `owner`, without validating its columns.
    pub fn seed_raw(&self, owner: &UserId, row: Row) {
        let mut shared = self.lock();
        let created_at = shared.next_created_at();
        shared.rows.push(StoredRow {
            row,
            owner: owner.clone(),
            created_at,
        });
    }

    /// Every stored row regardless of owner, in insertion order.
    pub fn all_rows(&self) -> Vec<Row> {
        self.lock().rows.iter().map(|r| r.row.clone()).collect()
    }

    /// Number of subscriptions whose receiver is still alive.
    pub fn live_subscriptions(&self) -> usize {
        let mut shared = self.lock();
        shared.subscribers.retain(|sub| !sub.tx.is_closed());
        shared.subscribers.len()
    }

    fn lock(&self) -> MutexGuard<'_, Shared> {
        self.shared.lock().unwrap_or_else(|e| e.into_inner())
    }
}

fn stored_row(bookmark: &Bookmark) -> StoredRow {
    StoredRow {
        row: bookmark.to_row(),
        owner: bookmark.owner_id.clone(),
        created_at: bookmark.created_at,
    }
}

/// A client session on a [`MemoryBackend`].
pub struct MemoryStore {
    backend: MemoryBackend,
    session: Mutex<Option<Identity>>,
    calls: Mutex<HashMap<Operation, usize>>,
    failures: Mutex<HashMap<Operation, RemoteError>>,
    gates: Mutex<HashMap<Operation, Arc<Semaphore>>>,
}

impl MemoryStore {
    /// Number of times `op` has been invoked on this client.
    pub fn calls(&self, op: Operation) -> usize {
        relock(&self.calls).get(&op).copied().unwrap_or(0)
    }

    /// Makes every following `op` fail with `error` until cleared.
    pub fn fail(&self, op: Operation, error: RemoteError) {
        relock(&self.failures).insert(op, error);
    }

    pub fn clear_failures(&self) {
        relock(&self.failures).clear();
    }

    /// Stalls `op` after it has computed its result.
    ///
    /// Each permit added to the returned semaphore lets one stalled call
    /// return. Queries stall after reading the table, so a released query
    /// reports the rows as they were when it ran.
    pub fn stall(&self, op: Operation) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        relock(&self.gates).insert(op, Arc::clone(&gate));
        gate
    }

    /// Stops stalling new calls of `op`. Calls already waiting stay stalled
    /// until permits are added to their semaphore.
    pub fn unstall(&self, op: Operation) {
        relock(&self.gates).remove(&op);
    }

    pub fn backend(&self) -> &MemoryBackend {
        &self.backend
    }

    fn enter(&self, op: Operation) -> RemoteResult<()> {
        *relock(&self.calls).entry(op).or_insert(0) += 1;
        match relock(&self.failures).get(&op) {
            Some(err) => Err(err.clone()),
            None => Ok(()),
        }
    }

    async fn pass_gate(&self, op: Operation) {
        let gate = relock(&self.gates).get(&op).cloned();
        if let Some(gate) = gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
    }

    fn session(&self) -> Option<Identity> {
        relock(&self.session).clone()
    }

    fn require_session(&self) -> RemoteResult<Identity> {
        self.session()
            .ok_or_else(|| RemoteError::Unauthorized("no active session".to_string()))
    }

    fn run_query(&self, query: &Query) -> Vec<Row> {
        let Some(identity) = self.session() else {
            return Vec::new();
        };
        let shared = self.backend.lock();
        let mut visible: Vec<&StoredRow> = shared
            .rows
            .iter()
            .filter(|r| r.owner == identity.id)
            .collect();
        if let Some(order) = &query.order {
            visible.sort_by(|a, b| {
                let ord = compare_column(a, b, &order.column);
                match order.direction {
                    Direction::Ascending => ord,
                    Direction::Descending => ord.reverse(),
                }
            });
        }
        visible.into_iter().map(|r| r.row.clone()).collect()
    }

    fn run_insert(&self, table: &str, fields: Row) -> RemoteResult<()> {
        let identity = self.require_session()?;
        if table != smark_core::BOOKMARKS {
            return Err(not_found(table));
        }
        match fields.get(OWNER_COLUMN) {
            Some(Value::String(owner)) if owner == identity.id.as_str() => {}
            _ => {
                return Err(RemoteError::Rejected {
                    status: 403,
                    message: "new row violates row-level security policy".to_string(),
                })
            }
        }
        let title = required_text(&fields, "title")?;
        let url = required_text(&fields, "url")?;

        let mut shared = self.backend.lock();
        let bookmark = Bookmark {
            id: uuid::Uuid::new_v4().to_string(),
            title,
            url,
            created_at: shared.next_created_at(),
            owner_id: identity.id,
        };
        let row = stored_row(&bookmark);
        let event = ChangeEvent::insert(table, row.row.clone());
        shared.rows.push(row);
        shared.publish(&event);
        Ok(())
    }

    fn run_delete(&self, table: &str, filter: &Filter) -> RemoteResult<()> {
        let identity = self.require_session()?;
        if table != smark_core::BOOKMARKS {
            return Err(not_found(table));
        }
        let mut shared = self.backend.lock();
        let (removed, kept): (Vec<_>, Vec<_>) = std::mem::take(&mut shared.rows)
            .into_iter()
            .partition(|r| r.owner == identity.id && filter.matches(&r.row));
        shared.rows = kept;
        for row in removed {
            shared.publish(&ChangeEvent::delete(table, row.row));
        }
        Ok(())
    }

    fn run_subscribe(&self, spec: ChannelSpec) -> RemoteResult<(SubscriptionHandle, ChangeStream)> {
        let identity = self.require_session()?;
        let (tx, rx) = mpsc::channel(FEED_CAPACITY);
        let mut shared = self.backend.lock();
        shared.next_subscription += 1;
        let id = shared.next_subscription;
        let handle = SubscriptionHandle::new(id, spec.name.clone());
        shared.subscribers.push(Subscriber {
            id,
            owner: identity.id,
            spec,
            tx,
        });
        Ok((handle, rx))
    }
}

impl RemoteStore for MemoryStore {
    fn current_identity(&self) -> BoxFuture<'_, RemoteResult<Option<Identity>>> {
        Box::pin(async move {
            self.enter(Operation::Identity)?;
            let identity = self.session();
            self.pass_gate(Operation::Identity).await;
            Ok(identity)
        })
    }

    fn query(&self, query: Query) -> BoxFuture<'_, RemoteResult<Vec<Row>>> {
        Box::pin(async move {
            self.enter(Operation::Query)?;
            if query.table != smark_core::BOOKMARKS {
                return Err(not_found(&query.table));
            }
            let rows = self.run_query(&query);
            self.pass_gate(Operation::Query).await;
            Ok(rows)
        })
    }

    fn insert(&self, table: &str, fields: Row) -> BoxFuture<'_, RemoteResult<()>> {
        let table = table.to_string();
        Box::pin(async move {
            self.enter(Operation::Insert)?;
            self.run_insert(&table, fields)?;
            self.pass_gate(Operation::Insert).await;
            Ok(())
        })
    }

    fn delete(&self, table: &str, filter: Filter) -> BoxFuture<'_, RemoteResult<()>> {
        let table = table.to_string();
        Box::pin(async move {
            self.enter(Operation::Delete)?;
            self.run_delete(&table, &filter)?;
            self.pass_gate(Operation::Delete).await;
            Ok(())
        })
    }

    fn subscribe(
        &self,
        spec: ChannelSpec,
    ) -> BoxFuture<'_, RemoteResult<(SubscriptionHandle, ChangeStream)>> {
        Box::pin(async move {
            self.enter(Operation::Subscribe)?;
            let opened = self.run_subscribe(spec)?;
            self.pass_gate(Operation::Subscribe).await;
            Ok(opened)
        })
    }

    fn unsubscribe(&self, handle: SubscriptionHandle) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            self.enter(Operation::Unsubscribe)?;
            self.backend
                .lock()
                .subscribers
                .retain(|sub| sub.id != handle.id());
            Ok(())
        })
    }

    fn sign_in_url(&self, provider: &str, redirect_to: &str) -> RemoteResult<String> {
        Ok(format!(
            "memory://authorize?provider={}&redirect_to={}",
            urlencoding::encode(provider),
            urlencoding::encode(redirect_to)
        ))
    }

    fn sign_out(&self) -> BoxFuture<'_, RemoteResult<()>> {
        Box::pin(async move {
            self.enter(Operation::SignOut)?;
            *relock(&self.session) = None;
            Ok(())
        })
    }
}

fn relock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|e| e.into_inner())
}

fn compare_column(a: &StoredRow, b: &StoredRow, column: &str) -> Ordering {
    if column == "created_at" {
        return a.created_at.cmp(&b.created_at);
    }
    match (a.row.get(column), b.row.get(column)) {
        (Some(Value::String(x)), Some(Value::String(y))) => x.cmp(y),
        (Some(Value::Number(x)), Some(Value::Number(y))) => x
            .as_f64()
            .partial_cmp(&y.as_f64())
            .unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Greater,
        (None, Some(_)) => Ordering::Less,
        _ => Ordering::Equal,
    }
}

fn required_text(fields: &Row, column: &str) -> RemoteResult<String> {
    match fields.get(column) {
        Some(Value::String(s)) => Ok(s.clone()),
        _ => Err(RemoteError::Rejected {
            status: 400,
            message: format!("null value in column \"{column}\" violates not-null constraint"),
        }),
    }
}

fn not_found(table: &str) -> RemoteError {
    RemoteError::Rejected {
        status: 404,
        message: format!("relation \"public.{table}\" does not exist"),
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;
