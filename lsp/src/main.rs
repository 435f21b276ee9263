#[tokio::main]
async fn main() {
    fqs_lsp::server::run().await;
}
