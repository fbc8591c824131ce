//! HTTP server: content as JSON, feeds as XML, the chat passthrough and
//! static files from the public directory

mod api;

use anyhow::Result;
use axum::{
    routing::{get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{services::ServeDir, trace::TraceLayer};

use crate::chat::{ChatClient, ChatCredentials, EnvironmentCheck};
use crate::content::{
    BookmarkMeta, MarkdownRenderer, PostMeta, ProjectMeta, RecommendationMeta, ReviewMeta,
};
use crate::feed::StructuredData;
use crate::Folio;

pub use api::ErrorResponse;

/// Shared, read-only server state
pub struct AppState {
    pub folio: Folio,
    pub renderer: MarkdownRenderer,
    pub chat: ChatClient,
    pub env_check: EnvironmentCheck,
}

impl AppState {
    pub fn new(
        folio: Folio,
        credentials: Option<ChatCredentials>,
        env_check: EnvironmentCheck,
    ) -> Result<Self> {
        let renderer = folio.renderer();
        let chat = ChatClient::new(folio.config.chat.clone(), credentials)?;
        Ok(Self {
            folio,
            renderer,
            chat,
            env_check,
        })
    }

    /// Read the chat credentials from the process environment
    pub fn from_env(folio: Folio) -> Result<Self> {
        let credentials = match ChatCredentials::from_env() {
            Ok(credentials) => Some(credentials),
            Err(e) => {
                tracing::warn!("{}", e);
                None
            }
        };
        Self::new(folio, credentials, EnvironmentCheck::from_env())
    }
}

/// `/api/<kind>`, `/api/<kind>/categories` and `/api/<kind>/:slug`
fn content_routes<M: StructuredData>(router: Router<Arc<AppState>>) -> Router<Arc<AppState>> {
    let base = format!("/api/{}", M::KIND.dir_name());
    router
        .route(&base, get(api::list::<M>))
        .route(&format!("{}/categories", base), get(api::categories::<M>))
        .route(&format!("{}/:slug", base), get(api::detail::<M>))
}

pub fn router(state: Arc<AppState>) -> Router {
    let public_dir = state.folio.public_dir.clone();

    let mut app = Router::new()
        .route("/api/rss", get(api::rss))
        .route("/rss.xml", get(api::rss))
        .route("/sitemap.xml", get(api::sitemap))
        .route("/robots.txt", get(api::robots))
        .route("/api/chat", post(api::chat))
        .route("/api/chat/test", post(api::chat_test))
        .route("/api/projects/:slug/posts", get(api::project_posts))
        .route(
            "/api/recommendations/:slug/related",
            get(api::related_recommendations),
        )
        .route(
            "/api/recommendations/featured",
            get(api::featured_recommendations),
        )
        .route("/api/reviews/featured", get(api::featured_reviews))
        .route("/api/bookmarks/featured", get(api::featured_bookmarks))
        .route("/api/posts/project/:slug", get(api::posts_by_project))
        .route("/api/projects/status/:status", get(api::projects_by_status))
        .route("/api/reviews/status/:status", get(api::reviews_by_status))
        .route(
            "/api/recommendations/status/:status",
            get(api::recommendations_by_status),
        )
        .route("/api/bookmarks/type/:kind", get(api::bookmarks_by_type));

    app = content_routes::<PostMeta>(app);
    app = content_routes::<ReviewMeta>(app);
    app = content_routes::<ProjectMeta>(app);
    app = content_routes::<RecommendationMeta>(app);
    app = content_routes::<BookmarkMeta>(app);

    app.fallback_service(ServeDir::new(public_dir))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

/// Start the server
pub async fn start(folio: &Folio, ip: &str, port: u16) -> Result<()> {
    let state = AppState::from_env(folio.clone())?;
    tracing::info!(
        "Chat assistant configured: {} (account {}, token {})",
        state.env_check.is_configured,
        state.env_check.account_id,
        state.env_check.api_token
    );
    let app = router(Arc::new(state));

    // Parse address - handle "localhost" specially
    let bind_ip = if ip == "localhost" { "127.0.0.1" } else { ip };
    let addr: SocketAddr = format!("{}:{}", bind_ip, port).parse()?;

    println!("Server running at http://{}:{}", ip, port);
    println!("Press Ctrl+C to stop.");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
