//! Best-effort submission records.
//!
//! [`record::RecordLogger`] retries a [`store::TabularStore`] append with exponential backoff.

pub(crate) mod credential;
pub(crate) mod entry;
pub(crate) mod record;
pub(crate) mod retry;
pub(crate) mod service_account;
pub(crate) mod sheets;
pub(crate) mod store;
