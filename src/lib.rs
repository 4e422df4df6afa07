pub mod agent;
pub mod app;
pub mod config;
pub mod error;
pub mod headless;
pub mod logging;
pub mod message;
pub mod runner;
pub mod session;
pub mod tools;
pub mod tui;
pub mod ui;

// Re-export commonly used items for easier access
pub use agent::{Agent, Roster, roster};
pub use config::GameConfig;
pub use error::{AIError, AppError};
pub use message::{Message, MessageType};
pub use runner::TurnEvent;
pub use session::{ChatMessage, Role, Session};

pub const MIN_WIDTH: u16 = 80;
pub const MIN_HEIGHT: u16 = 24;
