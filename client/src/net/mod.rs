//! Networking for the browser build.
//!
//! SYSTEM CONTEXT
//! ==============
//! `api` implements the session core's HTTP seam on top of `gloo-net`.

pub mod api;
