// Adapters layer: concrete implementations of the domain ports.

pub mod places;
pub mod storage;

pub use places::GooglePlacesClient;
pub use storage::LocalStorage;
