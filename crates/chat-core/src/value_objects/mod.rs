//! Value objects - immutable types that represent domain concepts

mod clock;
mod snowflake;

pub use clock::{Clock, ManualClock, SystemClock};
pub use snowflake::{Snowflake, SnowflakeGenerator, SnowflakeParseError};
