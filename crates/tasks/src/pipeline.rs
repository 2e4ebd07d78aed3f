//! Per-kind model pipelines run by a worker.
//!
//! Leaf analysis with an image chains two calls: the vision model
//! describes the leaf, then the reasoning model diagnoses from that
//! description. Every other kind is a single reasoning call wrapping the
//! caller's prompt in the kind's system prompt.

use croplens_core::prompts::{diagnosis_prompt, system_prompt};
use croplens_core::task::{TaskKind, TaskPayload};
use croplens_gateway::{ChatMessage, ChatModel, ModelSelection};

/// Run the pipeline for `kind` and return the final model text.
pub async fn run_pipeline(
    model: &dyn ChatModel,
    models: &ModelSelection,
    kind: TaskKind,
    payload: &TaskPayload,
) -> String {
    match (kind, payload.image.as_deref()) {
        (TaskKind::LeafAnalysis, Some(image)) => {
            let description = model
                .call(
                    &models.vision,
                    &[ChatMessage::user_with_image(payload.prompt.clone(), image)],
                )
                .await;
            tracing::debug!(chars = description.len(), "Leaf description received");

            let messages = [
                ChatMessage::system(system_prompt(kind)),
                ChatMessage::user(diagnosis_prompt(&description, payload.location.as_deref())),
            ];
            model.call(&models.reasoning, &messages).await
        }
        _ => {
            let messages = [
                ChatMessage::system(system_prompt(kind)),
                ChatMessage::user(payload.prompt.clone()),
            ];
            model.call(&models.reasoning, &messages).await
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use async_trait::async_trait;
    use croplens_core::prompts::{
        CHAT_SYSTEM_PROMPT, LEAF_DESCRIPTION_PROMPT, PATHOLOGIST_SYSTEM_PROMPT,
    };
    use croplens_gateway::messages::MessageContent;

    use super::*;

    /// Records every call and answers with a numbered reply.
    #[derive(Default)]
    struct RecordingModel {
        calls: Mutex<Vec<(String, Vec<ChatMessage>)>>,
    }

    #[async_trait]
    impl ChatModel for RecordingModel {
        async fn call(&self, model: &str, messages: &[ChatMessage]) -> String {
            let mut calls = self.calls.lock().unwrap();
            calls.push((model.to_string(), messages.to_vec()));
            format!("reply-{}", calls.len())
        }
    }

    fn models() -> ModelSelection {
        ModelSelection {
            vision: "vision-m".into(),
            reasoning: "reason-m".into(),
        }
    }

    #[tokio::test]
    async fn leaf_with_image_chains_vision_into_diagnosis() {
        let model = RecordingModel::default();
        let payload = TaskPayload {
            prompt: LEAF_DESCRIPTION_PROMPT.into(),
            image: Some("data:image/jpeg;base64,AA==".into()),
            location: Some("Pune".into()),
        };

        let answer = run_pipeline(&model, &models(), TaskKind::LeafAnalysis, &payload).await;

        assert_eq!(answer, "reply-2");
        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 2);

        let (vision_model, vision_msgs) = &calls[0];
        assert_eq!(vision_model, "vision-m");
        assert!(matches!(vision_msgs[0].content, MessageContent::Parts(_)));

        let (reason_model, reason_msgs) = &calls[1];
        assert_eq!(reason_model, "reason-m");
        assert_eq!(reason_msgs[0], ChatMessage::system(PATHOLOGIST_SYSTEM_PROMPT));
        let user = reason_msgs[1].text();
        assert!(user.contains("Based on this description: reply-1."));
        assert!(user.contains("Pune"));
    }

    #[tokio::test]
    async fn leaf_without_image_is_single_reasoning_call() {
        let model = RecordingModel::default();
        let payload = TaskPayload::text("Yellow streaks on maize leaves");

        run_pipeline(&model, &models(), TaskKind::LeafAnalysis, &payload).await;

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "reason-m");
        assert_eq!(calls[0].1[1].text(), "Yellow streaks on maize leaves");
    }

    #[tokio::test]
    async fn chat_uses_assistant_system_prompt() {
        let model = RecordingModel::default();

        run_pipeline(&model, &models(), TaskKind::Chat, &TaskPayload::text("hi")).await;

        let calls = model.calls.lock().unwrap();
        assert_eq!(calls[0].1[0], ChatMessage::system(CHAT_SYSTEM_PROMPT));
        assert_eq!(calls[0].1[1], ChatMessage::user("hi"));
    }
}
