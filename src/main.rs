#[tokio::main]
async fn main() -> anyhow::Result<()> {
    attendanced::start_server().await
}
