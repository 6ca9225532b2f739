//! A client-side protocol engine for the Apple Notification Center Service (ANCS).
//!
//! Over a reliable, record-oriented transport (GATT notifications on
//! Bluetooth Low Energy in practice), this crate subscribes to a
//! notification provider, decodes summary notifications, requests
//! attributes for individual notifications or the applications that raised
//! them, and invokes positive/negative actions.
//!
//! Service discovery, CCCD subscription mechanics, pairing, and transport
//! plumbing are not this crate's job — see [`transport::Transport`] for the
//! thin collaborator interface it expects instead.
//!
//! # Example
//!
//! ```rust
//! # use ancs_host::attributes::{NotifAttributeId, AppAttributeTable};
//! # use ancs_host::session::ClientSession;
//! # use embassy_sync::blocking_mutex::raw::NoopRawMutex;
//! # fn configure<'d, T: ancs_host::transport::Transport, S: ancs_host::event::EventSink>(
//! #     session: &ClientSession<'d, T, S, NoopRawMutex>,
//! #     title_buf: &'d mut [u8],
//! # ) {
//!     session.attr_add_notif(NotifAttributeId::Title, title_buf).unwrap();
//! # }
//! ```
#![cfg_attr(not(test), no_std)]

pub mod attributes;
pub mod config;
pub mod control_point;
pub mod cursor;
pub mod data_source;
pub mod error;
pub mod event;
pub(crate) mod fmt;
#[cfg(test)]
pub(crate) mod mock;
pub mod notification_source;
pub mod session;
pub mod transport;
pub mod uuid;

pub use error::Error;
pub use event::{Event, EventSink};
pub use session::ClientSession;
pub use transport::{DiscoveredCharacteristic, Transport};
