//! UI layer: the generator window, its form, result preview, and toasts.

pub mod app;

pub use app::EmojiGeneratorApp;
