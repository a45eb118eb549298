pub mod admin;
pub mod allergies;
pub mod auth;
pub mod calendar;
pub mod config;
pub mod database;
pub mod entities;
pub mod error;
pub mod functions;
pub mod guest;
pub mod mapper;
pub mod model;
pub mod placeholders;
pub mod router;
pub mod routes;
pub mod store;
pub mod util;
