mod cdp;
mod driver;
mod error;
mod session;

pub use cdp::CdpDriver;
pub use driver::PageDriver;
pub use error::{Error, Result};
pub use session::{PostSession, Poster};
