//! Reusable UI components

pub mod chat_input;
pub mod chat_message;
pub mod chat_panel;
pub mod claim_detail;
pub mod claim_table;
pub mod feedback_form;
pub mod filter_bar;
pub mod header;
pub mod loading;
pub mod require_auth;

pub use chat_input::ChatInput;
pub use chat_message::ChatMessage;
pub use chat_panel::ChatPanel;
pub use claim_detail::ClaimDetail;
pub use claim_table::ClaimTable;
pub use feedback_form::FeedbackPanel;
pub use filter_bar::{FilterBar, FilterHandle};
pub use header::Header;
pub use loading::{ErrorNotice, LoadingDots, LoadingOverlay, LoadingSpinner, Skeleton, TypingIndicator};
pub use require_auth::RequireAuth;
