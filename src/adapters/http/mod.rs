//! HTTP adapter.

pub mod server;

pub use server::{
    ConnectRequest, ConnectResponse, ErrorResponse, HttpServerConfig, QueryRequest,
    QueryResponse, SqlChatHttpServer,
};
