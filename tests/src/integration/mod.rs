//! Cross-component flows over real sockets.

pub mod http_flows;
pub mod ws_flows;
