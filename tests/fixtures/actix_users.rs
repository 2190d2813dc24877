use actix_web::{get, post, route, web, HttpResponse};

/// List users
///
/// @@@
/// Returns **all** users.
/// @@@
#[get("/users")]
async fn list_users() -> HttpResponse {
    HttpResponse::Ok().finish()
}

/// Create a user
#[post("/users")]
async fn create_user(body: web::Json<NewUser>) -> HttpResponse {
    let parser = RequestParser::new();
    parser.add_argument("name", r#type = String, location = "json", required = true);
    HttpResponse::Created().finish()
}

/// Report health
#[route("/health", method = "GET", method = "HEAD")]
async fn health() -> HttpResponse {
    HttpResponse::Ok().finish()
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(web::scope("/v1").service(list_users).service(create_user))
        .service(health);
}
