// MCP (Model Context Protocol) server exposing the Notion, Zoom and
// management operations of the Composio SDK as agent tools.

pub mod protocol;
pub mod server;
pub mod tools;

pub use server::McpServer;
