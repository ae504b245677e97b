mod common;
mod health_check;
mod login;
mod static_assets;
