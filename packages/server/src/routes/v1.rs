use utoipa_axum::router::OpenApiRouter;
use utoipa_axum::routes;

use crate::handlers;
use crate::state::AppState;

pub fn routes() -> OpenApiRouter<AppState> {
    OpenApiRouter::new()
        .routes(routes!(handlers::certificate::issue_certificate))
        .routes(routes!(handlers::certificate::list_my_certificates))
        .routes(routes!(handlers::certificate::verify_certificate))
        .routes(routes!(handlers::certificate::revoke_certificate))
}
