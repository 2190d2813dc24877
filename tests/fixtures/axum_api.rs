use axum::extract::Query;
use axum::routing::{get, post};
use axum::Router;

pub fn routes() -> Router {
    Router::new()
        .route("/add_data", post(add_data))
        .route("/get_data", get(get_data))
        .route("/data", get(get_data))
        .route("/delete_data", get(delete_data))
}

/// Add some data
///
/// @@@
/// ### args
/// | args | nullable | type | remark |
/// |--------|--------|--------|--------|
/// | title | false | str | todo title |
/// @@@
pub async fn add_data() -> &'static str {
    "ok"
}

/// Get some data
///
/// Returns one page of data.
pub async fn get_data(Query(params): Query<Params>) -> String {
    let parser = RequestParser::new();
    parser.add_argument("page", r#type = u32, location = "args", default = 1);
    parser.add_argument("q", location = "args", help = "search text");
    format!("{:?}", params)
}

/// Delete some data
pub async fn delete_data() {}
