#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    docsign_server::run().await
}
