#[actix_web::main]
async fn main() {
    if let Err(e) = plugdepot::app::startup::run().await {
        eprintln!("fatal: {}", e);
        std::process::exit(1);
    }
}
