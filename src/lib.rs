pub mod config;
pub mod credentials;
pub mod journal;
pub mod output;
pub mod prompt;
pub mod scoring;
pub mod session;
pub mod source;
pub mod stderr_buffer;
pub mod tui;
