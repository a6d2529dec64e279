//! Real-time delivery infrastructure.
//!
//! - [`PushMessage`] — the envelope pushed to connected clients.
//! - [`DeliveryChannel`] — per-topic publish/subscribe hub backed by
//!   `tokio::sync::broadcast`, shared via `Arc` across the application.
//! - [`Subscription`] — a handle held for the lifetime of one client
//!   connection; dropping it unsubscribes.

pub mod channel;
pub mod message;

pub use channel::{DeliveryChannel, Subscription};
pub use message::PushMessage;
