//! Core AssetDesk library (config, session, API client, controllers, runtime).

pub mod api;
pub mod auth;
pub mod config;
pub mod controllers;
pub mod models;
pub mod runtime;
pub mod session;
