// Presentation layer - Console rendering and operator input
pub mod app_state;
pub mod console_view;
pub mod handlers;
