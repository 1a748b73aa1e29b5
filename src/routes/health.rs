use actix_web::get;

#[get("/health")]
pub async fn health_check() -> &'static str {
    "OK"
}
