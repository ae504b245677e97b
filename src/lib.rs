pub mod authentication;
pub mod configuration;
pub mod domain;
pub mod error;
pub mod mailer;
pub mod notion;
pub mod repository;
pub mod routes;
pub mod session_state;
pub mod startup;
pub mod telemetry;
pub mod tokens;
pub mod util;
