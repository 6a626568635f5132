pub mod contract;
mod error;
pub mod events;
pub mod execute;
pub mod msg;
pub mod progression;
pub mod query;
pub mod resync;
pub mod state;

pub use crate::error::ContractError;
