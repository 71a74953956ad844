mod client;
mod server;

pub use client::WorkflowServiceClient;
pub use server::{GatewayHealth, GatewayServer};
