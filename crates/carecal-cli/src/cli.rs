use clap::{Parser, Subcommand};
use carecal_core::models::{DeleteScope, EditScope};

/// Scheduler for care-management offices: client visits, recurring meetings and monthly staff shifts
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Manage calendar events
    Event(EventCommand),
    /// Manage clients
    Client(ClientCommand),
    /// Manage schedule categories
    Category(CategoryCommand),
    /// Manage care managers
    Manager(ManagerCommand),
    /// Manage public holidays
    Holiday(HolidayCommand),
    /// View and plan the monthly shift grid
    Shift(ShiftCommand),
}

// ============================================================================
// Events
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct EventCommand {
    #[command(subcommand)]
    pub command: EventSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum EventSubcommand {
    /// Add an event, a weekly series or a monthly series
    Add(AddEventCommand),
    /// List occurrences in a month or date range
    List(ListEventsCommand),
    /// Edit an occurrence or its series
    Edit(EditEventCommand),
    /// Delete an occurrence, the following ones or the whole series
    Delete(DeleteEventCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddEventCommand {
    /// Category id or name (e.g. monitoring, assessment, conference, other)
    pub category: String,
    /// Client ID prefix or name; omit for a personal event
    #[arg(short, long)]
    pub client: Option<String>,
    /// Care manager who owns the event
    #[arg(long)]
    pub owner: Option<String>,
    /// Date of the event, or the first day of a series (default: today)
    #[arg(short, long)]
    pub date: Option<String>,
    /// Start time (HH:MM)
    #[arg(long)]
    pub start: Option<String>,
    /// End time (HH:MM)
    #[arg(long)]
    pub end: Option<String>,
    /// All-day event
    #[arg(long, conflicts_with_all = ["start", "end", "weekly", "monthly"])]
    pub all_day: bool,
    /// Repeat weekly on these days (e.g. "mon,thu")
    #[arg(long, conflicts_with = "monthly")]
    pub weekly: Option<String>,
    /// Repeat monthly on the same week and weekday as --date
    #[arg(long)]
    pub monthly: bool,
    /// Week of the month for a monthly series (1-4, implies --monthly)
    #[arg(long, conflicts_with = "weekly")]
    pub week: Option<u8>,
    /// Weekday for a monthly series (e.g. "tue", implies --monthly)
    #[arg(long, conflicts_with = "weekly")]
    pub weekday: Option<String>,
    #[arg(short, long)]
    pub notes: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListEventsCommand {
    /// Month to list (YYYY-MM, default: current month)
    #[arg(short, long, conflicts_with_all = ["from", "to"])]
    pub month: Option<String>,
    /// First day of the range
    #[arg(long, requires = "to")]
    pub from: Option<String>,
    /// Last day of the range
    #[arg(long, requires = "from")]
    pub to: Option<String>,
    /// Only this care manager's own events and clients
    #[arg(long)]
    pub manager: Option<String>,
    /// Only this client's schedule (name or ID prefix)
    #[arg(short, long)]
    pub client: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditEventCommand {
    /// The ID of the event to edit
    pub id: String,
    /// Date of the occurrence to edit (needed for weekly series)
    #[arg(short, long)]
    pub date: Option<String>,
    /// How to apply changes to a recurring event (this|all)
    #[arg(long, help = "How to apply changes to a recurring event (this|all)")]
    pub scope: Option<EditScope>,

    #[arg(long)]
    pub category: Option<String>,
    #[arg(short, long)]
    pub client: Option<String>,
    /// Turn the event into a personal one
    #[arg(long, conflicts_with = "client")]
    pub personal: bool,
    #[arg(long)]
    pub owner: Option<String>,
    /// Move a single occurrence to another date
    #[arg(long)]
    pub move_to: Option<String>,
    #[arg(long)]
    pub start: Option<String>,
    #[arg(long)]
    pub end: Option<String>,
    #[arg(long, conflicts_with_all = ["start", "end"])]
    pub all_day: bool,
    /// New weekdays for a weekly series (e.g. "tue,fri")
    #[arg(long)]
    pub weekly: Option<String>,
    /// New week of the month for a monthly series
    #[arg(long)]
    pub week: Option<u8>,
    /// New weekday for a monthly series
    #[arg(long)]
    pub weekday: Option<String>,
    #[arg(short, long)]
    pub notes: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteEventCommand {
    /// The ID of the event to delete
    pub id: String,
    /// Date of the occurrence to delete (needed for weekly series)
    #[arg(short, long)]
    pub date: Option<String>,
    /// How much of a recurring event to delete (this|following|all)
    #[arg(long, help = "How much of a recurring event to delete (this|following|all)")]
    pub scope: Option<DeleteScope>,
    /// Delete without confirmation
    #[arg(short, long)]
    pub force: bool,
}

// ============================================================================
// Clients
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ClientCommand {
    #[command(subcommand)]
    pub command: ClientSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ClientSubcommand {
    /// Add a client
    Add(AddClientCommand),
    /// List clients
    List(ListClientsCommand),
    /// Edit a client
    Edit(EditClientCommand),
    /// Delete a client
    Delete(DeleteClientCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddClientCommand {
    pub name: String,
    #[arg(long, default_value = "")]
    pub address: String,
    /// e.g. "Care level 2"
    #[arg(long, default_value = "")]
    pub care_level: String,
    /// Responsible care manager
    #[arg(long)]
    pub manager: Option<String>,
    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct ListClientsCommand {
    /// Only this care manager's clients
    #[arg(long)]
    pub manager: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct EditClientCommand {
    /// The ID of the client to edit
    pub id: String,
    #[arg(long)]
    pub name: Option<String>,
    #[arg(long)]
    pub address: Option<String>,
    #[arg(long)]
    pub care_level: Option<String>,
    #[arg(long)]
    pub manager: Option<String>,
    #[arg(long, conflicts_with = "manager")]
    pub manager_clear: bool,
    #[arg(long)]
    pub notes: Option<String>,
    #[arg(long, conflicts_with = "notes")]
    pub notes_clear: bool,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteClientCommand {
    /// The ID of the client to delete
    pub id: String,
    /// Force deletion without confirmation
    #[arg(short, long)]
    pub force: bool,
}

// ============================================================================
// Categories, managers, holidays
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct CategoryCommand {
    #[command(subcommand)]
    pub command: CategorySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum CategorySubcommand {
    /// Add a category
    Add(AddCategoryCommand),
    /// List categories
    List,
    /// Delete a category by ID or name
    Delete(DeleteCategoryCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct AddCategoryCommand {
    pub name: String,
    /// Hex colour such as #0ea5e9
    #[arg(long)]
    pub color: Option<String>,
    /// Default start time for new events (HH:MM)
    #[arg(long)]
    pub start: Option<String>,
    /// Default end time for new events (HH:MM)
    #[arg(long)]
    pub end: Option<String>,
}

#[derive(Parser, Debug, Clone)]
pub struct DeleteCategoryCommand {
    pub key: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ManagerCommand {
    #[command(subcommand)]
    pub command: ManagerSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ManagerSubcommand {
    /// Add a care manager
    Add(AddManagerCommand),
    /// List care managers
    List,
}

#[derive(Parser, Debug, Clone)]
pub struct AddManagerCommand {
    pub name: String,
}

#[derive(Parser, Debug, Clone)]
pub struct HolidayCommand {
    #[command(subcommand)]
    pub command: HolidaySubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum HolidaySubcommand {
    /// Add a public holiday
    Add(HolidayDateCommand),
    /// List public holidays
    List(ListHolidaysCommand),
    /// Remove a public holiday
    Remove(HolidayDateCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct HolidayDateCommand {
    pub date: String,
}

#[derive(Parser, Debug, Clone)]
pub struct ListHolidaysCommand {
    /// Only holidays in this month (YYYY-MM)
    #[arg(short, long)]
    pub month: Option<String>,
}

// ============================================================================
// Shifts
// ============================================================================

#[derive(Parser, Debug, Clone)]
pub struct ShiftCommand {
    /// Month of the grid (YYYY-MM, default: current month)
    #[arg(short, long, global = true)]
    pub month: Option<String>,
    #[command(subcommand)]
    pub command: ShiftSubcommand,
}

#[derive(Subcommand, Debug, Clone)]
pub enum ShiftSubcommand {
    /// Show the grid with per-staff totals
    Show,
    /// Advance a cell: unset, requested holiday, fixed work, paid leave, unset
    Cycle(ShiftCellCommand),
    /// Set a cell to a state, or "unset"
    Set(SetShiftCommand),
    /// Toggle telework on a cell
    Telework(ShiftCellCommand),
    /// Toggle who is on call on a day
    Oncall(OnCallCommand),
    /// Plan holidays and on-call duty for the month
    Auto(AutoShiftCommand),
    /// Remove the month's grid
    Clear(ClearShiftCommand),
}

#[derive(Parser, Debug, Clone)]
pub struct ShiftCellCommand {
    /// Staff name or 1-based position in the roster
    pub staff: String,
    /// Day of the month
    pub day: u32,
}

#[derive(Parser, Debug, Clone)]
pub struct SetShiftCommand {
    /// Staff name or 1-based position in the roster
    pub staff: String,
    /// Day of the month
    pub day: u32,
    /// work, hope_holiday, fixed_work, paid_leave, legal_holiday, legal_out_holiday or unset
    pub state: String,
}

#[derive(Parser, Debug, Clone)]
pub struct OnCallCommand {
    /// Day of the month
    pub day: u32,
    /// Staff name or 1-based position in the roster
    pub staff: String,
}

#[derive(Parser, Debug, Clone)]
pub struct AutoShiftCommand {
    /// Seed for a reproducible plan
    #[arg(long)]
    pub seed: Option<u64>,
    /// Statutory holidays per staff member (default from config)
    #[arg(long)]
    pub legal: Option<u32>,
    /// Extra holidays per staff member (default from config)
    #[arg(long)]
    pub legal_out: Option<u32>,
}

#[derive(Parser, Debug, Clone)]
pub struct ClearShiftCommand {
    /// Clear without confirmation
    #[arg(short, long)]
    pub force: bool,
}
