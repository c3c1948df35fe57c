pub mod repository;

pub use repository::PgStore;
