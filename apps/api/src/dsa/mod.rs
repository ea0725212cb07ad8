// DSA practice sheet: static catalog, filter derivation, and per-user sessions.

pub mod catalog;
pub mod filter;
pub mod handlers;
pub mod models;
pub mod session;
