// Data model for the Composio broker: response envelope, decode helpers and
// the validated Notion, Zoom and management records.

pub mod decode;
pub mod envelope;
pub mod management;
pub mod notion;
pub mod zoom;

pub use decode::{Decode, DecodeError};
pub use envelope::ResponseEnvelope;
