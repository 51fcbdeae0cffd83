//! Purpose: Define the public API surface of the pastebin binding.
//! Exports: Client, value objects, transport seam, and error types.
//! Role: The only public path to the binding internals.
//! Invariants: `Paste` values are obtainable only through `PastebinClient`.

mod client;
mod decode;
mod paste;
mod transport;

#[doc(hidden)]
pub use crate::core::error::to_exit_code;
pub use crate::core::error::{Error, ErrorKind};
pub use client::{NewPasteOptions, PastebinClient};
pub use paste::{Paste, TagCloudEntry};
pub use transport::{SERVICE_URL, Transport, XmlRpcTransport};
pub use xmlrpc::Value;
