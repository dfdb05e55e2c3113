pub mod error;
pub mod logger;
pub mod sdk_log;
pub mod validation;
