pub mod hooks;
pub mod register;
pub mod webhook;
