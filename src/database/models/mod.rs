pub mod ticker_row;
pub mod user_row;

pub use ticker_row::{Collection, CountRow, TickerRow};
pub use user_row::{NewUserRow, UserRow};
