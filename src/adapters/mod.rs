// Adapters layer: concrete implementations of the domain ports and the HTTP surface.

pub mod auth;
pub mod http;
pub mod memory;
