pub mod helpers;
mod money;
pub mod op;

pub use money::{Money, MoneyConversionError};
