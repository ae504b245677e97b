pub mod authentication;
pub mod common;
pub mod password_reset;
