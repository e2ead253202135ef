#[tokio::main]
async fn main() -> Result<(), ()> {
    sekimori::provider::main().await
}
