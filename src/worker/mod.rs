pub mod refresh;

pub use refresh::RefreshHandle;
