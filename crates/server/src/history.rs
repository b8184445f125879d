//! Bounded in-memory history of evaluation results.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use regression_facade::{EvaluationRecord, SelectionResult};
use serde::Serialize;
use tokio::sync::Mutex;

/// A stored result with the time it was produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HistoryEntry<T> {
    pub time: DateTime<Utc>,
    #[serde(flatten)]
    pub record: T,
}

/// Newest-last ring of entries that evicts the oldest beyond `capacity`.
#[derive(Debug)]
pub struct HistoryLog<T> {
    capacity: usize,
    entries: Mutex<VecDeque<HistoryEntry<T>>>,
}

impl<T: Clone> HistoryLog<T> {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub async fn push(&self, record: T) {
        self.push_at(Utc::now(), record).await;
    }

    pub async fn push_at(&self, time: DateTime<Utc>, record: T) {
        let mut entries = self.entries.lock().await;
        entries.push_back(HistoryEntry { time, record });
        while entries.len() > self.capacity {
            entries.pop_front();
        }
    }

    /// Newest first, skipping `skip` entries and returning at most `limit`.
    pub async fn page(&self, skip: usize, limit: usize) -> Vec<HistoryEntry<T>> {
        let entries = self.entries.lock().await;
        entries.iter().rev().skip(skip).take(limit).cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.entries.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

/// One history log per evaluation mode.
#[derive(Debug)]
pub struct HistoryStore {
    pub option: HistoryLog<EvaluationRecord>,
    pub best_model: HistoryLog<SelectionResult>,
    pub stack_model: HistoryLog<EvaluationRecord>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        Self {
            option: HistoryLog::new(capacity),
            best_model: HistoryLog::new(capacity),
            stack_model: HistoryLog::new(capacity),
        }
    }
}
