//! Delivery to chat-platform webhook endpoints.

pub mod mentions;
pub mod webhook;
