use axum::{routing::get, Router};

mod api;
mod todo;

/// Landing page
async fn index() -> &'static str {
    "routedoc demo"
}

fn app() -> Router {
    Router::new()
        .route("/", get(index))
        .nest("/api", api::routes())
}

fn register_resources(api: &mut Api) {
    api.add_resource(todo::TodoList, "/todos", "/todos/all");
    api.add_resource(todo::TodoListExclude, "/todos/excluded");
}

#[tokio::main]
async fn main() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:3000").await.unwrap();
    axum::serve(listener, app()).await.unwrap();
}
