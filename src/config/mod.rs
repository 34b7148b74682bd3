pub mod session;
pub mod settings;

pub use settings::{ClientConfig, ImageHostConfig, ServerConfig};
