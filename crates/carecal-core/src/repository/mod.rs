use crate::error::CoreError;
use crate::models::{
    CareManager, Category, Client, DeleteScope, Document, EditScope, Event, NewCategoryData,
    NewClientData, NewEventData, OccurrenceRef, UpdateClientData, YearMonth,
};
use crate::recurrence::{DateRange, Occurrence};
use crate::shift::ShiftMonth;
use async_trait::async_trait;
use chrono::{Local, NaiveDate};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info};
use uuid::Uuid;

// Domain modules implementing the traits below
pub mod care_managers;
pub mod categories;
pub mod clients;
pub mod events;
pub mod holidays;
pub mod shifts;

/// Domain-specific trait for calendar events
#[async_trait]
pub trait EventRepository {
    /// Saves a new event, or the twelve instances of a monthly pattern
    async fn add_event(&self, data: NewEventData) -> Result<Vec<Event>, CoreError>;
    async fn find_events(&self) -> Result<Vec<Event>, CoreError>;
    async fn find_event_by_id(&self, id: Uuid) -> Result<Option<Event>, CoreError>;
    async fn find_events_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Event>, CoreError>;
    /// Returns whether anything changed
    async fn update_event(&self, target: OccurrenceRef, data: NewEventData, scope: EditScope) -> Result<bool, CoreError>;
    /// Returns whether anything changed
    async fn delete_event(&self, target: OccurrenceRef, scope: DeleteScope) -> Result<bool, CoreError>;
    /// Visible occurrences in `range` ordered by start, narrowed by `filter`
    async fn find_occurrences(&self, range: DateRange, filter: OccurrenceFilter) -> Result<Vec<Occurrence>, CoreError>;
}

/// Narrows a schedule listing. Both filters must match when both are set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct OccurrenceFilter {
    /// A care manager's caseload: events they own or whose client they manage
    pub manager: Option<Uuid>,
    /// One client's schedule
    pub client: Option<Uuid>,
}

impl OccurrenceFilter {
    pub fn manager(id: Uuid) -> Self {
        Self { manager: Some(id), ..Self::default() }
    }

    pub fn client(id: Uuid) -> Self {
        Self { client: Some(id), ..Self::default() }
    }
}

/// Domain-specific trait for clients
#[async_trait]
pub trait ClientRepository {
    async fn add_client(&self, data: NewClientData) -> Result<Client, CoreError>;
    async fn update_client(&self, id: Uuid, data: UpdateClientData) -> Result<Client, CoreError>;
    /// Events keep referencing a removed client by id
    async fn delete_client(&self, id: Uuid) -> Result<(), CoreError>;
    async fn find_clients(&self) -> Result<Vec<Client>, CoreError>;
    async fn find_clients_for_manager(&self, manager_id: Uuid) -> Result<Vec<Client>, CoreError>;
    async fn find_client_by_id(&self, id: Uuid) -> Result<Option<Client>, CoreError>;
    async fn find_clients_by_short_id_prefix(&self, short_id: &str) -> Result<Vec<Client>, CoreError>;
}

/// Domain-specific trait for schedule categories
#[async_trait]
pub trait CategoryRepository {
    async fn add_category(&self, data: NewCategoryData) -> Result<Category, CoreError>;
    /// Removes by id or name. Events keep their copied label and colour.
    async fn delete_category(&self, key: &str) -> Result<Category, CoreError>;
    async fn find_categories(&self) -> Result<Vec<Category>, CoreError>;
}

/// Domain-specific trait for care managers
#[async_trait]
pub trait CareManagerRepository {
    async fn add_care_manager(&self, name: String) -> Result<CareManager, CoreError>;
    async fn find_care_managers(&self) -> Result<Vec<CareManager>, CoreError>;
    async fn find_care_manager_by_name(&self, name: &str) -> Result<Option<CareManager>, CoreError>;
}

/// Domain-specific trait for monthly shift grids
#[async_trait]
pub trait ShiftRepository {
    async fn load_shift_month(&self, month: YearMonth) -> Result<Option<ShiftMonth>, CoreError>;
    /// Stores the grid and returns it with `updated_at` stamped
    async fn save_shift_month(&self, month: YearMonth, shifts: ShiftMonth) -> Result<ShiftMonth, CoreError>;
    /// Returns whether a grid existed
    async fn clear_shift_month(&self, month: YearMonth) -> Result<bool, CoreError>;
}

/// Domain-specific trait for public holidays
#[async_trait]
pub trait HolidayRepository {
    async fn find_holidays(&self, range: Option<DateRange>) -> Result<Vec<NaiveDate>, CoreError>;
    /// Returns false when the date was already listed
    async fn add_holiday(&self, date: NaiveDate) -> Result<bool, CoreError>;
    /// Returns false when the date was not listed
    async fn remove_holiday(&self, date: NaiveDate) -> Result<bool, CoreError>;
}

/// Main repository trait that composes all domain traits
#[async_trait]
pub trait Repository:
    EventRepository +
    ClientRepository +
    CategoryRepository +
    CareManagerRepository +
    ShiftRepository +
    HolidayRepository
{
}

/// Repository over a single JSON document on disk.
///
/// Every mutation reads the whole document, applies the change and writes the
/// whole document back. A missing file reads as a fresh document.
pub struct JsonRepository {
    path: PathBuf,
    today: Option<NaiveDate>,
    write_lock: Mutex<()>,
}

impl JsonRepository {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            today: None,
            write_lock: Mutex::new(()),
        }
    }

    /// Pins the date used as "today" when regenerating monthly groups
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = Some(today);
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub(crate) fn today(&self) -> NaiveDate {
        self.today.unwrap_or_else(|| Local::now().date_naive())
    }

    /// Reads the document. Any read or parse failure fails the whole call.
    pub async fn load_document(&self) -> Result<Document, CoreError> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => {
                let document = serde_json::from_slice(&bytes)?;
                debug!(path = %self.path.display(), "Loaded document");
                Ok(document)
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                debug!(path = %self.path.display(), "No document yet, starting fresh");
                Ok(Document::default())
            }
            Err(e) => Err(e.into()),
        }
    }

    /// Writes the whole document, replacing the previous one.
    pub async fn save_document(&self, document: &Document) -> Result<(), CoreError> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_vec_pretty(document)?;
        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, json).await?;
        tokio::fs::rename(&tmp, &self.path).await?;
        info!(
            path = %self.path.display(),
            events = document.events.len(),
            clients = document.clients.len(),
            "Saved document"
        );
        Ok(())
    }

    /// Read-modify-write under the write lock. Nothing is written when `apply`
    /// fails.
    pub(crate) async fn update<T, F>(&self, apply: F) -> Result<T, CoreError>
    where
        F: FnOnce(&mut Document) -> Result<T, CoreError> + Send,
        T: Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut document = self.load_document().await?;
        let result = apply(&mut document)?;
        self.save_document(&document).await?;
        Ok(result)
    }
}

impl Repository for JsonRepository {}

/// Shared prefix lookup over the textual form of an id
pub(crate) fn matches_prefix(id: &Uuid, prefix: &str) -> bool {
    id.to_string().starts_with(&prefix.to_lowercase())
}
