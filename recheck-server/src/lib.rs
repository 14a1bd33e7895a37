mod metrics;
mod server;
pub mod services;
mod settings;

pub use server::{Router, configure_router, run, serve};
pub use settings::{Settings, ShutdownSettings};
