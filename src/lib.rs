pub mod record;
pub mod encode;
pub mod error;
pub mod sink;
pub mod noop_sink;
pub mod memory_sink;
pub mod layer;
pub mod init;
pub mod env;
pub mod handler;
