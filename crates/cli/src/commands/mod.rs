//! CLI commands for the capped allocation service.

pub mod allocate;
pub mod server;

pub use allocate::{run_allocate, AllocateArgs};
pub use server::{run_server, ServerArgs};
