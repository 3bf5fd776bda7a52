//! Business rules on top of the db layer

pub mod accounts;
pub mod documents;
pub mod events;
pub mod notify;
pub mod orders;
