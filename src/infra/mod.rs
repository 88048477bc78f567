pub mod bin_client;
pub mod default_objects;
pub mod fs_store;
