pub mod capture_surface;
pub mod media_inspector;
pub mod media_store;
pub mod path_resolver;
pub mod permission_gate;
pub mod resolution_sink;
