//! Outbound messaging trait.
//!
//! The relay writes back to the support platform in two ways: internal admin
//! notes (invisible to the user) and replies visible to the user.
//! Implementations live in polyglot-infra.

use polyglot_types::error::MessagingError;

/// Trait for posting into a conversation on the support platform.
///
/// Non-2xx responses must surface as `MessagingError::Status`.
pub trait MessagingClient: Send + Sync {
    /// Add an internal note authored by `admin_id`.
    fn add_note(
        &self,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), MessagingError>> + Send;

    /// Send a user-visible reply authored by `admin_id`.
    fn add_message(
        &self,
        conversation_id: &str,
        admin_id: &str,
        text: &str,
    ) -> impl std::future::Future<Output = Result<(), MessagingError>> + Send;
}
