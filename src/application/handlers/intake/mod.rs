//! Intake command handlers.

mod analyze_message;

pub use analyze_message::{
    AnalyzeMessageCommand, AnalyzeMessageError, AnalyzeMessageHandler, AnalyzeMessageSettings,
};
