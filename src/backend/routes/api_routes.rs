/**
 * Resource Routes
 *
 * # Routes
 *
 * ## Bearer token
 * - `POST /user/search`, `PUT /user/profile`, `DELETE /user/account`, `GET /user/data`
 * - `POST /board`, `GET /board`
 * - `POST /task`
 *
 * ## Bearer token, admin role
 * - `GET /admin/getalluser`, `POST /admin/edituser`, `POST /admin/createadmin`
 *
 * ## Public
 * - `POST /attachments/fileupload` - 64 MiB body limit
 */

use axum::{
    extract::DefaultBodyLimit,
    middleware,
    routing::{delete, get, post, put},
    Router,
};

use crate::backend::admin::{create_admin, edit_user, get_all_users};
use crate::backend::attachments::{upload_file, MAX_UPLOAD_BYTES};
use crate::backend::boards::{create_board, list_boards};
use crate::backend::middleware::{auth_middleware, require_admin};
use crate::backend::server::state::AppState;
use crate::backend::tasks::create_task;
use crate::backend::users::{delete_account, search_user, update_profile, user_data};

/// Configure user, board, task, admin and attachment routes
pub fn configure_api_routes(router: Router<AppState>, app_state: &AppState) -> Router<AppState> {
    let signed_in = Router::new()
        .route("/user/search", post(search_user))
        .route("/user/profile", put(update_profile))
        .route("/user/account", delete(delete_account))
        .route("/user/data", get(user_data))
        .route("/board", post(create_board).get(list_boards))
        .route("/task", post(create_task))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    // route_layer order: the auth layer is outermost and runs first
    let admin = Router::new()
        .route("/admin/getalluser", get(get_all_users))
        .route("/admin/edituser", post(edit_user))
        .route("/admin/createadmin", post(create_admin))
        .route_layer(middleware::from_fn(require_admin))
        .route_layer(middleware::from_fn_with_state(app_state.clone(), auth_middleware));

    let uploads = Router::new().route(
        "/attachments/fileupload",
        post(upload_file).layer(DefaultBodyLimit::max(MAX_UPLOAD_BYTES)),
    );

    router.merge(signed_in).merge(admin).merge(uploads)
}
