//! Background scheduling for finboard.
//!
//! Drives the sweeper on fixed intervals when no external cron calls the
//! `/cron/*` endpoints.

pub mod scheduler;

pub use scheduler::{JobExecutor, ScheduledJob, SchedulerConfig, run_scheduler};
