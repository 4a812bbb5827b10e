use car_auction_engine::web::app::run_app;

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    run_app(8080).await
}
