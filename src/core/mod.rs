pub mod dispatcher;
pub mod extractor;
pub mod validator;

pub use crate::domain::model::{Account, BatchReport, DeliveryRecord, SingleReport};
pub use crate::domain::ports::{CreditLedger, DeliveryStore, SmsGateway};
pub use crate::utils::error::Result;
