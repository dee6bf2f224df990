//! Send one prompt through the chat proxy and print the JSON reply.
//!
//! ```sh
//! GROQ_API_KEY=gsk_xxx cargo run --example chat -- "Suggest three viewpoints near the Golden Gate"
//! ```
use anyhow::Result;
use tracing::Level;
use wayfinder::{ChatProxy, providers::chat::ChatRequest};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    wayfinder::init_logging(Level::INFO)?;

    let prompt = std::env::args().skip(1).collect::<Vec<_>>().join(" ");
    let proxy = ChatProxy::from_env();

    let reply = proxy.handle(ChatRequest::new(prompt)).await;
    println!("{} {}", reply.status, serde_json::to_string(&reply.body)?);
    Ok(())
}
