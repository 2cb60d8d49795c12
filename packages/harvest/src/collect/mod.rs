//! Collection controller and session scoping.

pub mod controller;
pub mod session;

pub use controller::{CollectReport, CollectionController};
pub use session::{DateWindow, Session};
