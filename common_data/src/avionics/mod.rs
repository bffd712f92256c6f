pub mod data;
pub mod http;
