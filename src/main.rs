#[tokio::main]
async fn main() {
    feed_client::run().await;
}
