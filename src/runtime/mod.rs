/// Module containing the per-connection request pipeline
pub mod connection;
/// Module containing the handler trait
pub mod handler;
/// Module containing the listener and accept loop
pub mod server;
/// Module resolving static files under the public directory
pub mod static_files;
