//! Messaging platform clients.

pub mod intercom;

pub use intercom::IntercomClient;
