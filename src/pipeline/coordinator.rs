// src/pipeline/coordinator.rs

//! Bounded-parallel task execution with input-ordered results.
//!
//! Tasks complete in any order; each result lands in the slot of its
//! submission index so the caller sees them in input order.

use std::fmt::Display;
use std::future::Future;
use std::time::Duration;

use futures::stream::{self, StreamExt};

use crate::models::Config;

/// How one task ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TaskOutcome<T> {
    Completed(T),
    TimedOut,
}

/// Results of one coordinated batch.
#[derive(Debug)]
pub struct CoordinatorReport<T> {
    /// One slot per submitted item; `None` where every attempt timed out
    pub slots: Vec<Option<T>>,
    /// Submission indices of timed-out tasks, ascending
    pub timed_out: Vec<usize>,
    /// Extra attempts made after a timeout
    pub retried: usize,
}

/// Runs tasks with a fixed number in flight.
#[derive(Debug, Clone)]
pub struct Coordinator {
    width: usize,
    task_timeout: Duration,
    retries: usize,
    show_progress: bool,
}

impl Coordinator {
    pub fn new(width: usize, task_timeout: Duration, retries: usize) -> Self {
        Self {
            width: width.max(1),
            task_timeout,
            retries,
            show_progress: false,
        }
    }

    pub fn from_config(config: &Config) -> Self {
        Self::new(
            config.crawler.max_concurrent,
            Duration::from_secs(config.crawler.task_timeout_secs),
            config.crawler.task_retries as usize,
        )
        .with_progress(config.logging.show_progress)
    }

    pub fn with_progress(mut self, show_progress: bool) -> Self {
        self.show_progress = show_progress;
        self
    }

    /// Run `task` once per item, at most `width` at a time.
    pub async fn run<I, T, F, Fut>(&self, items: Vec<I>, task: F) -> CoordinatorReport<T>
    where
        I: Clone + Display,
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let total = items.len();
        let mut report = CoordinatorReport {
            slots: (0..total).map(|_| None).collect(),
            timed_out: Vec::new(),
            retried: 0,
        };
        if total == 0 {
            return report;
        }

        let task = &task;
        let mut results = stream::iter(items.into_iter().enumerate())
            .map(|(index, item)| async move {
                let (outcome, retried) = self.attempt(item, task).await;
                (index, outcome, retried)
            })
            .buffer_unordered(self.width);

        let step = (total / 10).max(1);
        let mut completed = 0;
        while let Some((index, outcome, retried)) = results.next().await {
            report.retried += retried;
            match outcome {
                TaskOutcome::Completed(value) => report.slots[index] = Some(value),
                TaskOutcome::TimedOut => report.timed_out.push(index),
            }

            completed += 1;
            if self.show_progress && (completed % step == 0 || completed == total) {
                log::info!("Progress: {}/{}", completed, total);
            }
        }

        report.timed_out.sort_unstable();
        report
    }

    /// Run one task, retrying attempts that exceed the timeout.
    async fn attempt<I, T, F, Fut>(&self, item: I, task: &F) -> (TaskOutcome<T>, usize)
    where
        I: Clone + Display,
        F: Fn(I) -> Fut,
        Fut: Future<Output = T>,
    {
        let mut retried = 0;
        loop {
            match tokio::time::timeout(self.task_timeout, task(item.clone())).await {
                Ok(value) => return (TaskOutcome::Completed(value), retried),
                Err(_) if retried < self.retries => {
                    retried += 1;
                    log::warn!(
                        "Task {} timed out after {:?}, retrying ({}/{})",
                        item,
                        self.task_timeout,
                        retried,
                        self.retries
                    );
                }
                Err(_) => {
                    log::warn!(
                        "Task {} timed out after {} attempt(s), giving up",
                        item,
                        retried + 1
                    );
                    return (TaskOutcome::TimedOut, retried);
                }
            }
        }
    }
}
