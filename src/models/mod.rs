pub mod market;
pub mod quote;
pub mod ticker;
pub mod user;

pub use market::{Market, SortOrder, SortSpec};
pub use quote::PriceQuote;
pub use ticker::{CompanyOfficer, IndexRecord, StockRecord, TickerRecord};
pub use user::{normalize_email, NewUser, User, UserProfile};
