pub mod ports;
pub mod process_use_case;
