pub mod client;

pub use client::{DeviceApi, EntityState, HubClient};
