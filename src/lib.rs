//! REwired — baseline assessment and onboarding installer.

pub mod assessment;
pub mod config;
pub mod dialogue;
pub mod error;
pub mod navigation;
pub mod routes;
pub mod session;
pub mod store;
