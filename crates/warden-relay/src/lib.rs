//! Resilient single-connection command relay.
//!
//! The remote console protocol allows one connection with one in-flight
//! request at a time, over a link that can drop at any moment. This crate
//! owns that one connection and everything around keeping it usable:
//!
//! 1. **Filter** — allow/deny policy over a command's leading token,
//!    checked before any connection work ([`CommandFilter`])
//! 2. **Slot** — the single guarded cell holding the live connection or
//!    its stand-in, with lazy redialing ([`ConnectionSlot`])
//! 3. **Watchdog** — periodic reachability probing that demotes a dead
//!    connection out of band ([`Watchdog`])
//! 4. **Service** — the `submit` pipeline tying the three together and
//!    handing callers a single-read result handle ([`RelayService`])
//!
//! # How it fits in the stack
//!
//! ```text
//! Front end (above)  ← parses chat text into Commands, renders results
//!     ↕
//! Relay (this crate)  ← serializes, times out, demotes, self-heals
//!     ↕
//! Adapter (below)  ← warden-rcon: dial/send primitives, cancellable
//! ```

mod command;
mod connection;
mod error;
mod filter;
mod service;
mod slot;
mod watchdog;

pub use command::{Command, CommandHandle};
pub use connection::Connection;
pub use error::RelayError;
pub use filter::CommandFilter;
pub use service::RelayService;
pub use slot::{ConnectionSlot, SharedConnection};
pub use watchdog::{
    Prober, TcpProber, Watchdog, WatchdogConfig, WatchdogHandle,
};
