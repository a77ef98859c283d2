// Outbound HTTP plumbing shared by all provider adapters

pub mod client;

pub use client::UpstreamClient;
