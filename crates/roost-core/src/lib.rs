pub mod config;
pub mod cookies;
pub mod error;

pub use config::Config;
pub use cookies::{CookieRecord, CookieStore};
pub use error::{Error, Result};
