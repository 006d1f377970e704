//! Core traits for sqlgate

mod driver;
mod from_row;
mod from_value;
mod to_row;
mod to_value;

pub use driver::{Driver, DriverError, DriverResult, ResultSet};
pub use from_row::FromRow;
pub use from_value::FromValue;
pub use to_row::ToRow;
pub use to_value::ToValue;
