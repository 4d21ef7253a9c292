// sprox-rs/sprox/src/reader/mod.rs

mod capabilities;
mod dispatch;
mod session;

pub use capabilities::Capabilities;
pub use session::{CommSettings, Connected, Reader, ReaderSession, Uninitialized};
