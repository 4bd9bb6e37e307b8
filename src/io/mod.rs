pub mod debounce;
pub mod lock;
pub mod settings_io;
pub mod store;
pub mod vault_io;
pub mod watcher;
