//! Device enumeration adapters

mod system;

pub use system::SystemDeviceEnumerator;
