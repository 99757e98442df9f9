//! Route handlers, grouped by area.

pub mod admin;
pub mod blacklist;
pub mod health;
pub mod pages;
