pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

// `crate::` throughout: a bare `use core::...` is ambiguous with the builtin
// `core` crate under uniform paths.
pub use crate::adapters::gateway::HttpGateway;
pub use crate::adapters::memory::{MemoryLedger, MemoryStore};
pub use crate::config::toml_config::DispatchConfig;
pub use crate::config::CliConfig;
pub use crate::core::dispatcher::{BatchSource, Dispatcher};
pub use crate::domain::model::{
    Account, BatchReport, DeliveryRecord, DeliveryStatus, SendOutcome, SingleReport,
};
pub use crate::domain::ports::{CreditLedger, DeliveryStore, SmsGateway};
pub use crate::utils::error::{DispatchError, Result};
