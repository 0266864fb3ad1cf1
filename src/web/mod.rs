//! Browser UI: pure view models plus askama page handlers

pub mod handlers;
pub mod view_models;
