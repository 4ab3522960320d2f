pub mod app_settings;
pub mod notes;
pub mod persistence;
pub mod shopping;

pub use app_settings::AppSettings;
pub use notes::NoteMap;
pub use persistence::{FileStore, KeyValueStore};
pub use shopping::ShoppingList;
