pub mod server;

pub use server::{build_router, build_state, Server};
