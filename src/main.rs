#[tokio::main]
async fn main() -> anyhow::Result<()> {
    careconnect::server::run().await
}
