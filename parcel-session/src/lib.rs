//! parcel-session library
//!
//! Delivery-order intake, storage and resolution for the parcel desk.

pub mod access;
pub mod command;
pub mod db;
pub mod desk;
pub mod error;
pub mod lifecycle;
pub mod notify;
pub mod report;
pub mod state;
pub mod validate;
