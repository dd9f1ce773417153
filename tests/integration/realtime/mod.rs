//! Realtime hub integration tests

mod hub_test;
mod socket_test;
