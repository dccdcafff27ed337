mod client;

pub use client::EmissionsBackend;
