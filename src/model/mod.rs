//! Application-side shapes of guests, event settings, and mail.
//!
//! These are what the controllers work with; `crate::mapper` converts them to
//! and from the flat rows of the hosted store.

pub mod email;
pub mod event;
pub mod participant;

pub use email::{EmailLog, EmailTemplate, EmailTrigger, LogStatus, default_templates};
pub use event::{
    Activity, BuffetCategory, EventConfig, ProgramItem, default_buffet,
    default_contribution_suggestions, default_dietary_options, default_program,
};
pub use participant::{AvatarStyle, DietaryTags, FoodItem, Participant, RsvpStatus};
