//! Integration tests against the router and the realtime hub

pub mod realtime;
