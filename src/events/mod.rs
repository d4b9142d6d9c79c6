//! # Events Module
//!
//! Event-driven progress reporting for the dedup engine.
//!
//! ## Design
//! The core library emits events through channels, allowing any front end
//! (CLI today, anything else later) to subscribe and display progress.
//!
//! ## Example
//! ```rust,ignore
//! let (sender, receiver) = EventChannel::new();
//!
//! // In a separate thread, listen for events
//! std::thread::spawn(move || {
//!     for event in receiver.iter() {
//!         match event {
//!             Event::Engine(EngineEvent::RecordFinished { completed, total, .. }) => {
//!                 println!("Processed {}/{}", completed, total)
//!             }
//!             _ => {}
//!         }
//!     }
//! });
//!
//! // Run the engine with the sender
//! engine.run_with_events(records, &sender);
//! ```

mod channel;
mod types;

pub use channel::{EventChannel, EventReceiver, EventSender, null_sender};
pub use types::*;
