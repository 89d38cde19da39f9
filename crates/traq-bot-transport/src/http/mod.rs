//! HTTP webhook ingress.

mod server;

pub use server::{
    HEADER_EVENT, HEADER_REQUEST_ID, HEADER_TOKEN, PushServerHandle, push_router, serve_push,
};
