pub mod file;
pub mod hash;

pub use file::{HostList, HostStore};
