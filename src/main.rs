#[tokio::main]
async fn main() -> std::io::Result<()> {
    studio_booking::run().await
}
