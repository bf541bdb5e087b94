//! `conversation.admin.noted`: admin commands and relayed replies.

use polyglot_types::conversation::{ConversationState, Language};
use polyglot_types::error::HandlerError;
use polyglot_types::event::ConversationEvent;
use tracing::{debug, info, warn};

use super::{
    AdminCommand, HandlerContext, HandlerOutcome, language_failure, resolve_language,
};
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
    let Some(command) = AdminCommand::parse(&event.body) else {
        debug!(conversation_id = %event.conversation_id, "plain note ignored");
        return Ok(HandlerOutcome::Ignored);
    };

    let event_type = event.topic.as_str();
    let _guard = ctx.locks.acquire(&event.conversation_id).await;

    let Some(mut state) = ctx.store.get(&event.conversation_id, event_type).await? else {
        warn!(conversation_id = %event.conversation_id, ?command, "no state for admin command");
        return Ok(HandlerOutcome::StateMissing);
    };

    let outcome = match command {
        AdminCommand::Start => {
            state.start();
            HandlerOutcome::StateUpdated
        }
        AdminCommand::Stop => {
            state.stop();
            HandlerOutcome::StateUpdated
        }
        AdminCommand::DetectStart => {
            let detected = ctx
                .translator
                .detect(&state.last_message)
                .await
                .map_err(|e| language_failure(e, event, "detect"))?;
            let language = resolve_language(detected, state.language);
            note_last_message(ctx, event, &mut state, language).await?;
            state.start_with(language);
            HandlerOutcome::NoteSent
        }
        AdminCommand::Force(language) => {
            note_last_message(ctx, event, &mut state, language).await?;
            state.start_with(language);
            HandlerOutcome::NoteSent
        }
        AdminCommand::Relay(text) => {
            let Some(language) = state.language.filter(|_| state.is_started()) else {
                debug!(
                    conversation_id = %event.conversation_id,
                    status = %state.status,
                    "relay ignored, no active language"
                );
                return Ok(HandlerOutcome::Ignored);
            };
            relay(ctx, event, &mut state, language, &text).await?;
            HandlerOutcome::MessageRelayed
        }
    };

    ctx.store.set(&state, event_type).await?;
    info!(
        conversation_id = %event.conversation_id,
        status = %state.status,
        language = ?state.language,
        ?outcome,
        "admin command applied"
    );
    Ok(outcome)
}

/// Analyse the stored last user message in `language` and post the note.
///
/// Updates the context on `state` only after the note is posted.
async fn note_last_message<C, T, A, M>(
    ctx: &HandlerContext<C, T, A, M>,
    event: &ConversationEvent,
    state: &mut ConversationState,
    language: Language,
) -> Result<(), HandlerError>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
{
    let analysed = ctx
        .accumulator
        .user_message(&state.last_message, &state.context_analysis, language)
        .await
        .map_err(|e| language_failure(e, event, "analyze_user_message"))?;
    ctx.send_note(event, &analysed.note).await?;
    state.context_analysis = analysed.context;
    Ok(())
}

/// Translate `text`, send it to the user, then fold it into the context.
async fn relay<C, T, A, M>(
    ctx: &HandlerContext<C, T, A, M>,
    event: &ConversationEvent,
    state: &mut ConversationState,
    language: Language,
    text: &str,
) -> Result<(), HandlerError>
where
    C: Cache,
    T: TranslationService,
    A: ContextAnalyzer,
    M: MessagingClient,
{
    let translated = ctx
        .translator
        .translate(text, language)
        .await
        .map_err(|e| language_failure(e, event, "translate"))?;
    ctx.send_message(event, ctx.relay_author(event), &translated)
        .await?;

    state.context_analysis = ctx
        .accumulator
        .agent_message(text, &state.context_analysis, language)
        .await
        .map_err(|e| language_failure(e, event, "analyze_agent_message"))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::handler::fixtures::{BOT_ADMIN, TestContext, admin_note, context, context_with};
    use crate::testing::{MockAnalyzer, MockMessaging, MockTranslator};
    use polyglot_types::conversation::{ConversationStatus, DetectedLanguage};

    async fn seed(ctx: &TestContext, language: Option<Language>) {
        let mut state = ConversationState::new("42", "mera refund kab aayega");
        state.context_analysis = "ctx".into();
        if let Some(language) = language {
            state.start_with(language);
        }
        ctx.store.set(&state, "test").await.unwrap();
    }

    async fn stored(ctx: &TestContext) -> ConversationState {
        ctx.store.get("42", "test").await.unwrap().unwrap()
    }

    #[tokio::test]
    async fn start_and_stop_toggle_status() {
        let ctx = context();
        seed(&ctx, None).await;

        let outcome = handle(&ctx, &admin_note("42", "!start", "a1")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::StateUpdated);
        assert_eq!(stored(&ctx).await.status, ConversationStatus::Started);

        handle(&ctx, &admin_note("42", "!stop", "a1")).await.unwrap();
        let state = stored(&ctx).await;
        assert_eq!(state.status, ConversationStatus::Stopped);
        assert!(state.language.is_none());
        assert!(ctx.messaging.notes().is_empty());
    }

    #[tokio::test]
    async fn stop_clears_forced_language() {
        let ctx = context();
        seed(&ctx, Some(Language::Bengali)).await;
        handle(&ctx, &admin_note("42", "!stop", "a1")).await.unwrap();
        assert!(stored(&ctx).await.language.is_none());
    }

    #[tokio::test]
    async fn detect_start_notes_last_message_in_detected_language() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Hindi),
            MockAnalyzer::default(),
            MockMessaging::default(),
        );
        seed(&ctx, None).await;

        let outcome = handle(&ctx, &admin_note("42", "!detect start", "a1")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::NoteSent);

        assert_eq!(ctx.translator.service().calls(), vec!["detect"]);
        assert_eq!(ctx.accumulator.analyzer().languages(), vec![Language::Hindi]);
        let notes = ctx.messaging.notes();
        assert_eq!(notes.len(), 1);
        assert_eq!(notes[0].1, BOT_ADMIN);
        assert!(notes[0].2.starts_with("original:mera refund kab aayega\n\n"));

        let state = stored(&ctx).await;
        assert_eq!(state.status, ConversationStatus::Started);
        assert_eq!(state.language, Some(Language::Hindi));
        assert_eq!(state.context_analysis, "ctx+user:mera refund kab aayega");
    }

    #[tokio::test]
    async fn force_sets_language_and_notes_last_message() {
        for (command, language) in [
            ("!force hi", Language::Hinglish),
            ("!force hindi", Language::Hindi),
            ("!force bn", Language::Bengali),
        ] {
            let ctx = context();
            seed(&ctx, None).await;

            let outcome = handle(&ctx, &admin_note("42", command, "a1")).await.unwrap();
            assert_eq!(outcome, HandlerOutcome::NoteSent);
            assert!(ctx.translator.service().calls().is_empty(), "{command} must not detect");
            assert_eq!(ctx.accumulator.analyzer().languages(), vec![language]);
            assert_eq!(ctx.messaging.notes().len(), 1);

            let state = stored(&ctx).await;
            assert!(state.is_started());
            assert_eq!(state.language, Some(language));
        }
    }

    #[tokio::test]
    async fn relay_translates_sends_and_accumulates() {
        let ctx = context();
        seed(&ctx, Some(Language::Hindi)).await;

        let outcome = handle(&ctx, &admin_note("42", "!your refund is processed", "a7"))
            .await
            .unwrap();
        assert_eq!(outcome, HandlerOutcome::MessageRelayed);

        assert_eq!(
            ctx.messaging.messages(),
            vec![(
                "42".to_string(),
                "a7".to_string(),
                "[hi] your refund is processed".to_string()
            )]
        );
        assert_eq!(ctx.accumulator.analyzer().agent_calls(), 1);
        assert_eq!(
            stored(&ctx).await.context_analysis,
            "ctx+agent:your refund is processed"
        );
    }

    #[tokio::test]
    async fn relay_in_english_is_sent_untranslated() {
        let ctx = context();
        seed(&ctx, Some(Language::English)).await;

        handle(&ctx, &admin_note("42", "!hello there", "a7")).await.unwrap();
        assert!(ctx.translator.service().calls().is_empty());
        assert_eq!(ctx.messaging.messages()[0].2, "hello there");
    }

    #[tokio::test]
    async fn relay_without_author_uses_bot_admin() {
        let ctx = context();
        seed(&ctx, Some(Language::Hindi)).await;
        let mut note = admin_note("42", "!ok", "a7");
        note.author = None;

        handle(&ctx, &note).await.unwrap();
        assert_eq!(ctx.messaging.messages()[0].1, BOT_ADMIN);
    }

    #[tokio::test]
    async fn relay_while_stopped_is_ignored() {
        let ctx = context();
        seed(&ctx, None).await;

        let outcome = handle(&ctx, &admin_note("42", "!hello", "a7")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Ignored);
        assert!(ctx.messaging.messages().is_empty());
        assert_eq!(ctx.accumulator.analyzer().agent_calls(), 0);
    }

    #[tokio::test]
    async fn relay_started_without_language_is_ignored() {
        let ctx = context();
        let mut state = ConversationState::new("42", "hi");
        state.start();
        ctx.store.set(&state, "test").await.unwrap();

        let outcome = handle(&ctx, &admin_note("42", "!hello", "a7")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::Ignored);
        assert!(ctx.messaging.messages().is_empty());
    }

    #[tokio::test]
    async fn plain_note_is_ignored_without_reading_state() {
        let ctx = context();
        let outcome = handle(&ctx, &admin_note("42", "original:foo\n\nbar", BOT_ADMIN))
            .await
            .unwrap();
        assert_eq!(outcome, HandlerOutcome::Ignored);
    }

    #[tokio::test]
    async fn plain_note_leaves_started_conversation_alone() {
        let ctx = context();
        seed(&ctx, Some(Language::Hindi)).await;
        let before = stored(&ctx).await;

        let outcome = handle(&ctx, &admin_note("42", "random text", "a1")).await.unwrap();

        assert_eq!(outcome, HandlerOutcome::Ignored);
        assert_eq!(stored(&ctx).await, before);
        assert!(ctx.messaging.notes().is_empty());
        assert!(ctx.messaging.messages().is_empty());
        assert!(ctx.translator.service().calls().is_empty());
        assert_eq!(ctx.accumulator.analyzer().user_calls(), 0);
        assert_eq!(ctx.accumulator.analyzer().agent_calls(), 0);
    }

    #[tokio::test]
    async fn command_without_state_is_reported_not_raised() {
        let ctx = context();
        let outcome = handle(&ctx, &admin_note("42", "!start", "a1")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::StateMissing);
        assert!(ctx.store.get("42", "test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_relay_leaves_state_untouched() {
        let ctx = context_with(
            MockTranslator::default(),
            MockAnalyzer::default(),
            MockMessaging::failing(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        let err = handle(&ctx, &admin_note("42", "!hello", "a7")).await.unwrap_err();
        assert!(matches!(err, HandlerError::Domain(_)));
        assert_eq!(ctx.accumulator.analyzer().agent_calls(), 0);
        assert_eq!(stored(&ctx).await.context_analysis, "ctx");
    }

    #[tokio::test]
    async fn failed_force_note_keeps_previous_status() {
        let ctx = context_with(
            MockTranslator::default(),
            MockAnalyzer::default(),
            MockMessaging::failing(),
        );
        seed(&ctx, None).await;

        assert!(handle(&ctx, &admin_note("42", "!force bn", "a1")).await.is_err());
        let state = stored(&ctx).await;
        assert_eq!(state.status, ConversationStatus::Stopped);
        assert!(state.language.is_none());
    }
}
