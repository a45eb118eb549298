pub use super::email_log::Entity as EmailLog;
pub use super::email_template::Entity as EmailTemplate;
pub use super::event_config::Entity as EventConfig;
pub use super::participant::Entity as Participant;
