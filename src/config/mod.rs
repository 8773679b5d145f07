pub mod loader;
pub mod schema;

pub use loader::{ConfigOverrides, load_config};
pub use schema::Config;
