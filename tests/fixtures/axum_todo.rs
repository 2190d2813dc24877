use axum::Json;

/// Todo list
///
/// Manage the whole list.
pub struct TodoList;

impl Resource for TodoList {
    /// Get todo list
    ///
    /// @@@
    /// ```json
    /// [{"task": "build an API"}]
    /// ```
    /// @@@
    async fn get(&self) -> Json<Vec<Todo>> {
        Json(load_todos())
    }

    /// Add a todo
    ///
    /// Creates one entry.
    async fn post(&self) {
        let parser = RequestParser::new();
        parser.add_argument("task", r#type = String, location = "json", required = true);
    }
}

/// Hidden resource
pub struct TodoListExclude;

impl Resource for TodoListExclude {
    /// Never shown
    fn get(&self) {}
}
