//! # Cooperative scheduler
//!
//! Runs each registered task on its own period. Tasks are stepped to
//! completion one at a time, there is no preemption, so the shares need no
//! locking. When several tasks are due in the same call the higher priority
//! one runs first, ties go to the earlier registered task.

// ------------------------------------------------------------------------------------------------
// IMPORTS
// ------------------------------------------------------------------------------------------------

use log::{debug, error, trace};
use serde::Serialize;
use std::fmt;

use util::{
    module::Task,
    time::{ticks_add, ticks_diff},
};

// ------------------------------------------------------------------------------------------------
// TRAITS
// ------------------------------------------------------------------------------------------------

/// Type erased view of a [`Task`] so tasks of different types can share one
/// scheduler.
pub trait Schedulable {
    fn name(&self) -> &str;

    /// Step the task, returning the numeric code of its new mode.
    fn step_code(&mut self) -> Result<u8, BoxedError>;

    fn shutdown(&mut self) -> Result<(), BoxedError>;
}

// ------------------------------------------------------------------------------------------------
// STRUCTS
// ------------------------------------------------------------------------------------------------

/// Error type of a type erased task.
pub type BoxedError = Box<dyn std::error::Error + Send + Sync>;

/// Bookkeeping for one registered task.
#[derive(Debug, Clone, Serialize)]
pub struct TaskStats {
    pub name: String,

    pub priority: u8,

    /// Units: milliseconds
    pub period_ms: u32,

    /// Number of steps run.
    pub runs: u64,

    /// Number of steps that started more than one period late.
    pub late_runs: u64,

    /// Mode code after the last step, `None` before the first.
    pub last_mode: Option<u8>,
}

struct TaskEntry {
    task: Box<dyn Schedulable>,
    stats: TaskStats,
    next_run_ms: Option<u32>,
}

/// Priority scheduler over a millisecond tick.
#[derive(Default)]
pub struct Scheduler {
    tasks: Vec<TaskEntry>,
}

// ------------------------------------------------------------------------------------------------
// ENUMS
// ------------------------------------------------------------------------------------------------

/// Errors raised while scheduling.
#[derive(Debug, thiserror::Error)]
pub enum SchedError {
    #[error("Task {task} failed: {source}")]
    TaskFailed { task: String, source: BoxedError },

    #[error("Shutdown of task {task} failed: {source}")]
    ShutdownFailed { task: String, source: BoxedError },
}

// ------------------------------------------------------------------------------------------------
// IMPLS
// ------------------------------------------------------------------------------------------------

impl<T> Schedulable for T
where
    T: Task,
{
    fn name(&self) -> &str {
        Task::name(self)
    }

    fn step_code(&mut self) -> Result<u8, BoxedError> {
        Task::step(self)
            .map(Into::into)
            .map_err(|e| Box::new(e) as BoxedError)
    }

    fn shutdown(&mut self) -> Result<(), BoxedError> {
        Task::shutdown(self).map_err(|e| Box::new(e) as BoxedError)
    }
}

impl Scheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a task. It first runs on the next call to `run_once`.
    pub fn add<T>(&mut self, task: T, priority: u8, period_ms: u32)
    where
        T: Schedulable + 'static,
    {
        let stats = TaskStats {
            name: task.name().to_string(),
            priority,
            period_ms,
            runs: 0,
            late_runs: 0,
            last_mode: None,
        };

        debug!(
            "Scheduler: added {} (priority {}, period {} ms)",
            stats.name, priority, period_ms
        );

        self.tasks.push(TaskEntry {
            task: Box::new(task),
            stats,
            next_run_ms: None,
        });
    }

    /// Run every task that is due at `now_ms`, highest priority first.
    ///
    /// Returns the number of tasks stepped. The first task error stops the
    /// call and is returned, tasks after it are not run.
    pub fn run_once(&mut self, now_ms: u32) -> Result<usize, SchedError> {
        let mut due: Vec<usize> = self
            .tasks
            .iter()
            .enumerate()
            .filter(|(_, e)| match e.next_run_ms {
                Some(t) => ticks_diff(now_ms, t) >= 0,
                None => true,
            })
            .map(|(i, _)| i)
            .collect();

        // Stable, so equal priorities keep registration order
        due.sort_by(|a, b| self.tasks[*b].stats.priority.cmp(&self.tasks[*a].stats.priority));

        for &i in due.iter() {
            let entry = &mut self.tasks[i];

            let mode = match entry.task.step_code() {
                Ok(m) => m,
                Err(source) => {
                    error!("Task {} failed: {}", entry.stats.name, source);
                    return Err(SchedError::TaskFailed {
                        task: entry.stats.name.clone(),
                        source,
                    });
                }
            };

            if entry.stats.last_mode != Some(mode) {
                trace!(
                    "{}: mode {:?} -> {}",
                    entry.stats.name,
                    entry.stats.last_mode,
                    mode
                );
            }
            entry.stats.last_mode = Some(mode);
            entry.stats.runs += 1;

            // Keep to the period grid unless more than a period behind
            let period = entry.stats.period_ms as i32;
            entry.next_run_ms = Some(match entry.next_run_ms {
                Some(t) if ticks_diff(now_ms, t) < period => ticks_add(t, period),
                Some(_) => {
                    entry.stats.late_runs += 1;
                    ticks_add(now_ms, period)
                }
                None => ticks_add(now_ms, period),
            });
        }

        Ok(due.len())
    }

    /// Shut every task down in registration order.
    ///
    /// All tasks are shut down even if one fails, the first failure is
    /// returned.
    pub fn shutdown(&mut self) -> Result<(), SchedError> {
        let mut result = Ok(());

        for entry in self.tasks.iter_mut() {
            debug!("Shutting down {}", entry.stats.name);
            if let Err(source) = entry.task.shutdown() {
                error!("Shutdown of {} failed: {}", entry.stats.name, source);
                if result.is_ok() {
                    result = Err(SchedError::ShutdownFailed {
                        task: entry.stats.name.clone(),
                        source,
                    });
                }
            }
        }

        result
    }

    pub fn stats(&self) -> Vec<TaskStats> {
        self.tasks.iter().map(|e| e.stats.clone()).collect()
    }
}

impl fmt::Display for Scheduler {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "{:<18} {:>4} {:>7} {:>9} {:>6} {:>5}",
            "TASK", "PRI", "PERIOD", "RUNS", "LATE", "MODE"
        )?;
        for e in self.tasks.iter() {
            let s = &e.stats;
            writeln!(
                f,
                "{:<18} {:>4} {:>7} {:>9} {:>6} {:>5}",
                s.name,
                s.priority,
                s.period_ms,
                s.runs,
                s.late_runs,
                s.last_mode.map(|m| m.to_string()).unwrap_or_else(|| "-".into())
            )?;
        }
        Ok(())
    }
}

// ------------------------------------------------------------------------------------------------
// TESTS
// ------------------------------------------------------------------------------------------------
