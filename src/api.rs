use axum::{
    extract::{Json, Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::error;

use crate::ai_service::{self, ConversationType};
use crate::chat::{ChatEngine, ChatTurn, MAX_MESSAGE_CHARS};
use crate::emotion::{classify_emotion, EmotionResult};
use crate::insights::{summarize, ConversationInsights};
use crate::mock_reply::{MockReply, ReplyContext};
use crate::models::{Conversation, Message};
use crate::store::KeyValueStore;
use crate::summary::derive_summary;
use crate::topic::{classify_topic, ClassificationResult};

type AppState<S> = Arc<ChatEngine<S>>;

fn internal(e: anyhow::Error) -> StatusCode {
    error!("Request failed: {:#}", e);
    StatusCode::INTERNAL_SERVER_ERROR
}

fn check_length(text: &str) -> Result<(), StatusCode> {
    if text.chars().count() > MAX_MESSAGE_CHARS {
        return Err(StatusCode::BAD_REQUEST);
    }
    Ok(())
}

async fn health_check() -> impl IntoResponse {
    "AURA insight server is running"
}

// --- Classification ---

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyReq {
    message: String,
    conversation_id: Option<String>,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ClassifyResp {
    emotion: EmotionResult,
    topic: ClassificationResult,
    conversation_type: ConversationType,
}

fn history_for<S: KeyValueStore>(
    engine: &ChatEngine<S>,
    id: Option<&str>,
) -> Result<Vec<Message>, StatusCode> {
    let Some(id) = id else {
        return Ok(Vec::new());
    };
    match engine.store().get(id).map_err(internal)? {
        Some(conversation) => Ok(conversation.history),
        None => Err(StatusCode::NOT_FOUND),
    }
}

async fn classify<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Json(req): Json<ClassifyReq>,
) -> Result<Json<ClassifyResp>, StatusCode> {
    check_length(&req.message)?;
    let history = history_for::<S>(&engine, req.conversation_id.as_deref())?;
    Ok(Json(ClassifyResp {
        emotion: classify_emotion(&req.message, &history),
        topic: classify_topic(&req.message, &history),
        conversation_type: ai_service::detect_conversation_type(&req.message),
    }))
}

#[derive(Deserialize)]
struct MockReplyReq {
    message: String,
}

async fn mock_reply<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Json(req): Json<MockReplyReq>,
) -> Result<Json<MockReply>, StatusCode> {
    check_length(&req.message)?;
    let context = ReplyContext {
        conversation_type: ai_service::detect_conversation_type(&req.message),
        expertise_level: ai_service::detect_expertise_level(&req.message),
        emotional_tone: classify_emotion(&req.message, &[]).emotion,
    };
    engine
        .mock_reply(&req.message, &context)
        .map(Json)
        .map_err(internal)
}

// --- Conversation API Handlers ---

async fn list_conversations<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
) -> Result<Json<Vec<Conversation>>, StatusCode> {
    engine.store().list().map(Json).map_err(internal)
}

#[derive(Serialize)]
struct ClearResp {
    deleted: usize,
}

async fn clear_conversations<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
) -> Result<Json<ClearResp>, StatusCode> {
    engine
        .store()
        .clear_all()
        .map(|deleted| Json(ClearResp { deleted }))
        .map_err(internal)
}

async fn get_conversation<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<Conversation>, StatusCode> {
    match engine.store().get(&id) {
        Ok(Some(conversation)) => Ok(Json(conversation)),
        Ok(None) => Err(StatusCode::NOT_FOUND),
        Err(e) => Err(internal(e)),
    }
}

async fn delete_conversation<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<StatusCode, StatusCode> {
    engine
        .store()
        .delete(&id)
        .map(|_| StatusCode::NO_CONTENT)
        .map_err(internal)
}

#[derive(Serialize)]
struct InsightsResp {
    insights: Option<ConversationInsights>,
    summary: String,
}

async fn conversation_insights<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Path(id): Path<String>,
) -> Result<Json<InsightsResp>, StatusCode> {
    let history = history_for::<S>(&engine, Some(&id))?;
    Ok(Json(InsightsResp {
        insights: summarize(&history),
        summary: derive_summary(&history),
    }))
}

#[derive(Deserialize)]
struct PostMessageReq {
    content: String,
}

async fn post_message<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Path(id): Path<String>,
    Json(req): Json<PostMessageReq>,
) -> Result<Json<ChatTurn>, StatusCode> {
    check_length(&req.content)?;
    if engine.store().get(&id).map_err(internal)?.is_none() {
        return Err(StatusCode::NOT_FOUND);
    }
    engine
        .send_message(Some(&id), &req.content)
        .await
        .map(Json)
        .map_err(internal)
}

async fn start_chat<S: KeyValueStore + 'static>(
    State(engine): State<AppState<S>>,
    Json(req): Json<PostMessageReq>,
) -> Result<Json<ChatTurn>, StatusCode> {
    check_length(&req.content)?;
    engine
        .send_message(None, &req.content)
        .await
        .map(Json)
        .map_err(internal)
}

pub fn router<S: KeyValueStore + 'static>(engine: AppState<S>) -> Router {
    let api = Router::new()
        .route("/classify", post(classify::<S>))
        .route("/mock-reply", post(mock_reply::<S>))
        .route("/chat", post(start_chat::<S>))
        .route(
            "/conversations",
            get(list_conversations::<S>).delete(clear_conversations::<S>),
        )
        .route(
            "/conversations/{id}",
            get(get_conversation::<S>).delete(delete_conversation::<S>),
        )
        .route("/conversations/{id}/messages", post(post_message::<S>))
        .route("/conversations/{id}/insights", get(conversation_insights::<S>));

    Router::new()
        .route("/", get(health_check))
        .route("/health", get(health_check))
        .nest("/api", api)
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(engine)
}
