//! Type a query into a headless session, pick the top hit and print where the
//! map ended up.
//!
//! ```sh
//! cargo run --example headless_search -- "Golden Gate Bridge"
//! WAYFINDER_GEOCODER=mapbox MAPBOX_ACCESS_TOKEN=pk.xxx cargo run --example headless_search -- Paris
//! ```
use anyhow::Result;
use tracing::{Level, info};
use wayfinder::{GeocodeConfig, MemorySurface, SearchSession, SessionConfigBuilder};

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    wayfinder::init_logging(Level::INFO)?;

    let query = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "Golden Gate".to_owned());

    let geocode = GeocodeConfig::from_env()?;
    info!(provider = %geocode.provider, "Using geocoder");
    let config = SessionConfigBuilder::conservative().build();
    let (session, handle) = SearchSession::with_client(geocode, MemorySurface::new(), &config)?;
    let running = tokio::spawn(session.run());

    // Simulate someone typing the query one character at a time.
    let mut typed = String::new();
    for ch in query.chars() {
        typed.push(ch);
        handle.input(typed.as_str())?;
        tokio::time::sleep(std::time::Duration::from_millis(80)).await;
    }

    let settled = handle
        .wait_for(|s| !s.search.loading && s.search.phase != wayfinder::SearchPhase::Typing)
        .await?;
    for (rank, candidate) in settled.search.candidates.iter().enumerate() {
        println!("{:>2}. {} {}", rank + 1, candidate.label(), candidate.coordinates());
    }

    if let Some(top) = settled.search.candidates.first() {
        handle.select(top.id().clone())?;
        let selected = handle.wait_for(|s| s.selected.is_some()).await?;
        println!(
            "Camera flew to {} at zoom {}",
            selected.camera.center, selected.camera.zoom
        );
    } else {
        println!("No matches for {query:?}");
    }

    handle.shutdown()?;
    let navigator = running.await?;
    for marker in navigator.surface().markers() {
        println!("Marker: {} {}", marker.label, marker.at);
    }
    Ok(())
}
