pub mod config;
pub mod payment;
pub mod ports;
pub mod principal;
pub mod transfer;
