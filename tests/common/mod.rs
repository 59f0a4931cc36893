pub mod fake_transport;
pub mod fixtures;
