//! `conversation.admin.closed`: forget the conversation.

use polyglot_types::error::HandlerError;
use polyglot_types::event::ConversationEvent;
use tracing::info;

use super::{HandlerContext, HandlerOutcome};
use crate::analysis::ContextAnalyzer;
use crate::cache::Cache;
use crate::language::TranslationService;
use crate::messaging::MessagingClient;

pub(crate) async fn handle<C, T, A, M>(
    ctx: &HandlerContext<C, T, A, M>,
    event: &ConversationEvent,
) -> Result<HandlerOutcome, HandlerError>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
{
    let _guard = ctx.locks.acquire(&event.conversation_id).await;
    ctx.store
        .delete(&event.conversation_id, event.topic.as_str())
        .await?;

    info!(conversation_id = %event.conversation_id, "conversation closed");
    Ok(HandlerOutcome::StateDeleted)
}
