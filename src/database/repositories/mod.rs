/// Repository pattern implementations
///
/// - `TickerStore`: read capability of one ticker collection (stocks or indices)
/// - `UserRepository`: identity store keyed by email
///
/// Each trait has a PostgreSQL implementation and an in-memory one.

pub mod in_memory;
pub mod ticker_repository;
pub mod user_repository;

pub use in_memory::{InMemoryTickerStore, InMemoryUserRepository};
pub use ticker_repository::{TickerRepositoryImpl, TickerStore};
pub use user_repository::{UserRepository, UserRepositoryImpl};
