use crate::backend::ConsultationBackend;
use crate::configuration::Configuration;
use crate::consultation_manager::ConsultationManager;
use crate::graphql::build_schema;
use async_graphql::http::GraphiQLSource;
use async_graphql_axum::GraphQL;
use axum::extract::State;
use axum::response::Html;
use axum::{routing::get, Router};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

#[derive(Clone)]
struct AppState {
    graphql_path: String,
}

pub fn create_app<B: ConsultationBackend, C: Configuration>(backend: B, configuration: C) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    let schema = build_schema(ConsultationManager::new(backend));
    let graphql_path = configuration.graphql_path();

    Router::new()
        .route(
            &graphql_path,
            get(get_graphiql).post_service(GraphQL::new(schema)),
        )
        .with_state(AppState { graphql_path })
        .layer(cors)
}

async fn get_graphiql(State(state): State<AppState>) -> Html<String> {
    debug!("get graphiql called");
    Html(
        GraphiQLSource::build()
            .endpoint(&state.graphql_path)
            .finish(),
    )
}
