pub mod backends;

pub use backends::memory::MemoryStorage;
pub use backends::sqlite::SqliteStorage;

pub mod prelude {
    pub use super::backends::memory::MemoryStorage;
    pub use super::backends::sqlite::SqliteStorage;
    pub use wn_core::NewsStorage;
}
