//! # Carecal Core Library
//!
//! Scheduling core for a small care-management office: client visits and
//! meetings on a calendar, and a monthly staff shift grid with an automatic
//! holiday planner.
//!
//! ## Features
//!
//! - **Weekly Templates**: one stored rule per weekly series, expanded lazily
//!   for any visible window, with per-date exceptions and a series end date
//! - **Monthly Groups**: "Nth weekday of the month" patterns materialized as
//!   twelve concrete events sharing a group id
//! - **Scoped Mutations**: edit or delete this occurrence, this and following,
//!   or the whole series
//! - **Shift Planning**: statutory and extra holiday quotas, daily off caps,
//!   streak breaking and fair on-call rotation with a seedable random source
//! - **Single-Document Storage**: everything lives in one JSON file
//!
//! ## Core Modules
//!
//! - [`models`]: Core data structures and save payloads
//! - [`recurrence`]: Monthly and weekly date rules, occurrence expansion
//! - [`series`]: Save, edit and delete actions over the stored event list
//! - [`shift`]: Shift grid operations and the auto-assignment planner
//! - [`repository`]: Data access layer with Repository pattern
//! - [`error`]: Error types
//!
//! ## Example Usage
//!
//! ```rust,no_run
//! use carecal_core::{
//!     models::{EventTiming, NewEventData},
//!     repository::{EventRepository, JsonRepository},
//! };
//! use chrono::NaiveDate;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), carecal_core::error::CoreError> {
//!     let repo = JsonRepository::new("data/db.json");
//!
//!     // First Tuesday of every month for a year
//!     let data = NewEventData {
//!         subject_id: None,
//!         owner_id: None,
//!         category: "conference".to_string(),
//!         notes: String::new(),
//!         date: NaiveDate::from_ymd_opt(2026, 2, 3).unwrap(),
//!         timing: EventTiming::Monthly { week: 1, weekday: 2, start_time: None, end_time: None },
//!     };
//!
//!     let created = repo.add_event(data).await?;
//!     println!("Created {} events", created.len());
//!
//!     Ok(())
//! }
//! ```

pub mod error;
pub mod models;
pub mod recurrence;
pub mod repository;
pub mod series;
pub mod shift;
