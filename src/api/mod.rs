pub mod error;
pub mod handlers;

use axum::{
    Router,
    routing::{get, post, put},
};
use tower_http::cors::CorsLayer;

use crate::api::handlers::*;

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/program/{week}/{day}", get(get_program_day))
        .route("/today", get(get_today))
        .route("/readiness", post(post_readiness))
        .route("/workouts/{date}", post(post_workout))
        .route("/maxes", get(get_maxes))
        .route("/maxes/{lift}", put(put_max))
        .route("/settings", put(put_settings))
        .route("/records", get(get_records))
        .route("/streaks", get(get_streaks))
        .route("/consistency", get(get_consistency))
        .route("/summary", get(get_summary))
        .route("/plates", get(get_plates))
        .route("/metcons", get(get_metcons))
        .route("/coach", post(post_coach))
        .route("/coach/actions", post(post_coach_actions))
        .route(
            "/backup",
            get(get_backup).put(put_backup).delete(delete_backup),
        )
        .layer(CorsLayer::permissive())
        .with_state(state)
}
