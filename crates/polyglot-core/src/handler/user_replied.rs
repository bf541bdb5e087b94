//! `conversation.user.replied`: track the message and, while translating,
//! turn non-English replies into an admin note.

use polyglot_types::error::HandlerError;
use polyglot_types::event::ConversationEvent;
use polyglot_types::result::excerpt;
use tracing::{debug, info, warn};

use super::{HandlerContext, HandlerOutcome, language_failure, resolve_language};
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
    let event_type = event.topic.as_str();
    let _guard = ctx.locks.acquire(&event.conversation_id).await;

    let Some(mut state) = ctx.store.get(&event.conversation_id, event_type).await? else {
        warn!(conversation_id = %event.conversation_id, "no state for user reply");
        return Ok(HandlerOutcome::StateMissing);
    };

    if !state.is_started() {
        state.last_message = event.body.clone();
        ctx.store.set(&state, event_type).await?;
        debug!(conversation_id = %event.conversation_id, "reply recorded while stopped");
        return Ok(HandlerOutcome::StateUpdated);
    }

    let detected = ctx
        .translator
        .detect(&event.body)
        .await
        .map_err(|e| language_failure(e, event, "detect"))?;

    if detected.is_english() {
        state.last_message = event.body.clone();
        ctx.store.set(&state, event_type).await?;
        debug!(conversation_id = %event.conversation_id, "english reply recorded");
        return Ok(HandlerOutcome::StateUpdated);
    }

    let language = resolve_language(detected, state.language);
    let analysed = ctx
        .accumulator
        .user_message(&event.body, &state.context_analysis, language)
        .await
        .map_err(|e| language_failure(e, event, "analyze_user_message"))?;

    ctx.send_note(event, &analysed.note).await?;

    state.last_message = event.body.clone();
    state.context_analysis = analysed.context;
    state.language = Some(language);
    ctx.store.set(&state, event_type).await?;

    info!(
        conversation_id = %event.conversation_id,
        %detected,
        %language,
        message = %excerpt(&event.body),
        "translated reply noted"
    );
    Ok(HandlerOutcome::NoteSent)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{AnalysisStatus, UserMessageAnalysis};
    use crate::handler::fixtures::{BOT_ADMIN, TestContext, context, context_with, event};
    use crate::testing::{MockAnalyzer, MockMessaging, MockTranslator};
    use polyglot_types::conversation::{ConversationState, DetectedLanguage, Language};
    use polyglot_types::error::LanguageError;
    use polyglot_types::event::EventTopic;

    fn reply(body: &str) -> ConversationEvent {
        event(EventTopic::UserReplied, "42", body)
    }

    async fn seed(ctx: &TestContext, language: Option<Language>) {
        let mut state = ConversationState::new("42", "first");
        state.context_analysis = "ctx".into();
        if let Some(language) = language {
            state.start_with(language);
        }
        ctx.store.set(&state, "test").await.unwrap();
    }

    async fn started(ctx: &TestContext) {
        let mut state = ConversationState::new("42", "first");
        state.context_analysis = "ctx".into();
        state.start();
        ctx.store.set(&state, "test").await.unwrap();
    }

    #[tokio::test]
    async fn stopped_conversation_only_records_message() {
        let ctx = context();
        seed(&ctx, None).await;

        let outcome = handle(&ctx, &reply("kya hua")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::StateUpdated);

        let state = ctx.store.get("42", "test").await.unwrap().unwrap();
        assert_eq!(state.last_message, "kya hua");
        assert!(ctx.translator.service().calls().is_empty());
        assert_eq!(ctx.accumulator.analyzer().user_calls(), 0);
        assert!(ctx.messaging.notes().is_empty());
    }

    #[tokio::test]
    async fn english_reply_while_started_only_records_message() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::English),
            MockAnalyzer::default(),
            MockMessaging::default(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        let outcome = handle(&ctx, &reply("where is my order")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::StateUpdated);

        let state = ctx.store.get("42", "test").await.unwrap().unwrap();
        assert_eq!(state.last_message, "where is my order");
        assert_eq!(state.language, Some(Language::Hindi));
        assert_eq!(ctx.accumulator.analyzer().user_calls(), 0);
        assert!(ctx.messaging.notes().is_empty());
    }

    #[tokio::test]
    async fn non_english_reply_is_noted_and_context_updated() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Bengali),
            MockAnalyzer::default(),
            MockMessaging::default(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        let outcome = handle(&ctx, &reply("amar order kothay")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::NoteSent);

        assert_eq!(ctx.accumulator.analyzer().user_calls(), 1);
        assert_eq!(ctx.accumulator.analyzer().languages(), vec![Language::Bengali]);
        assert_eq!(
            ctx.messaging.notes(),
            vec![(
                "42".to_string(),
                BOT_ADMIN.to_string(),
                "original:amar order kothay\n\n[en] amar order kothay".to_string()
            )]
        );

        let state = ctx.store.get("42", "test").await.unwrap().unwrap();
        assert_eq!(state.last_message, "amar order kothay");
        assert_eq!(state.context_analysis, "ctx+user:amar order kothay");
        assert_eq!(state.language, Some(Language::Bengali));
    }

    #[tokio::test]
    async fn uncertain_detection_keeps_stored_language() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Uncertain),
            MockAnalyzer::default(),
            MockMessaging::default(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        handle(&ctx, &reply("ok ji")).await.unwrap();
        assert_eq!(ctx.accumulator.analyzer().languages(), vec![Language::Hindi]);
    }

    #[tokio::test]
    async fn uncertain_detection_without_language_uses_hinglish() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Uncertain),
            MockAnalyzer::default(),
            MockMessaging::default(),
        );
        started(&ctx).await;

        handle(&ctx, &reply("ok ji")).await.unwrap();
        let state = ctx.store.get("42", "test").await.unwrap().unwrap();
        assert_eq!(state.language, Some(Language::Hinglish));
    }

    #[tokio::test]
    async fn uncertain_analysis_note_lists_two_interpretations() {
        let analysis = UserMessageAnalysis {
            status: AnalysisStatus::Uncertain,
            translated_text: "come tomorrow".into(),
            corrected_text: None,
            interpretations: vec!["A".into(), "B".into(), "C".into()],
            context_analysis: "delivery time unclear".into(),
        };
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Hinglish),
            MockAnalyzer::returning(analysis),
            MockMessaging::default(),
        );
        seed(&ctx, Some(Language::Hinglish)).await;

        handle(&ctx, &reply("kal aana")).await.unwrap();
        let notes = ctx.messaging.notes();
        let note = &notes[0].2;
        assert!(note.contains("\nA\n"));
        assert!(note.ends_with("\nB"));
        assert!(!note.contains('C'));
    }

    #[tokio::test]
    async fn missing_state_is_reported_not_raised() {
        let ctx = context();
        let outcome = handle(&ctx, &reply("hello?")).await.unwrap();
        assert_eq!(outcome, HandlerOutcome::StateMissing);
        assert!(ctx.store.get("42", "test").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn failed_note_leaves_state_untouched() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Hindi),
            MockAnalyzer::default(),
            MockMessaging::failing(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        let err = handle(&ctx, &reply("namaste")).await.unwrap_err();
        match err {
            HandlerError::Domain(e) => assert_eq!(e.exception_class, "MessagingApiError"),
            other => panic!("expected domain failure, got {other:?}"),
        }
        let state = ctx.store.get("42", "test").await.unwrap().unwrap();
        assert_eq!(state.last_message, "first");
        assert_eq!(state.context_analysis, "ctx");
    }

    #[tokio::test]
    async fn detection_outage_is_a_domain_failure() {
        let ctx = context_with(
            MockTranslator::failing(),
            MockAnalyzer::default(),
            MockMessaging::default(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        let err = handle(&ctx, &reply("namaste")).await.unwrap_err();
        assert!(matches!(err, HandlerError::Domain(ref e) if e.exception_class == "LanguageApiError"));
    }

    #[tokio::test]
    async fn broken_analysis_contract_is_unclassified() {
        let ctx = context_with(
            MockTranslator::detecting(DetectedLanguage::Hindi),
            MockAnalyzer::failing(|| LanguageError::ContractViolation("one interpretation".into())),
            MockMessaging::default(),
        );
        seed(&ctx, Some(Language::Hindi)).await;

        let err = handle(&ctx, &reply("namaste")).await.unwrap_err();
        assert!(matches!(err, HandlerError::Unclassified { .. }));
        assert!(ctx.messaging.notes().is_empty());
    }
}
