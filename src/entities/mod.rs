pub mod prelude;

pub mod email_log;
pub mod email_template;
pub mod event_config;
pub mod participant;
