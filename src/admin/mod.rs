//! Organizer tools: guest CRUD, CSV, templates, bulk email and statistics.

pub mod console;
pub mod csv;
pub mod recipients;
pub mod sort;
pub mod stats;

pub use console::{
    AdminConsole, AdminError, Composition, ConfirmedDispatch, ImportReport, ParticipantEdit,
    PreparedDispatch, ValidationError, sample_participant,
};
pub use recipients::RecipientFilter;
pub use sort::{SortDirection, SortKey};
pub use stats::{DietaryCount, Stats};
