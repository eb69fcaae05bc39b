//! HTTP surface: the SSE generation server and its client transport.

pub mod client;
pub mod dto;
pub mod server;

pub use client::HttpStreamTransport;
pub use dto::{ErrorBody, GenerateBody, ModelsBody, ModelsQuery, ServicesBody};
pub use server::{AppState, router, serve};
