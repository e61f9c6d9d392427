#[tokio::main]
async fn main() {
    if let Err(e) = billed::run().await {
        eprintln!("{e}");
        std::process::exit(1);
    }
}
