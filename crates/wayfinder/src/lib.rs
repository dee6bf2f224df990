//! Wayfinder - Debounced Location Search and Map Navigation
//!
//! Wayfinder is the headless core of an interactive map with a location search
//! box. It turns a stream of keystrokes into as few geocoding calls as
//! possible, keeps the results panel consistent while responses race each
//! other, and flies the map to whatever the user picks.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use wayfinder::{GeocodeConfig, MemorySurface, SearchSession, SessionConfig};
//!
//! # async fn demo() -> Result<(), wayfinder::error::WayfinderError> {
//! let (session, handle) = SearchSession::with_client(
//!     GeocodeConfig::nominatim(),
//!     MemorySurface::new(),
//!     &SessionConfig::default(),
//! )?;
//! let running = tokio::spawn(session.run());
//!
//! handle.input("Golden Gate")?;
//! let shown = handle.wait_for(|s| s.search.results_visible).await?;
//! if let Some(first) = shown.search.candidates.first() {
//!     handle.select(first.id().clone())?;
//! }
//!
//! handle.shutdown()?;
//! let navigator = running.await.expect("session task panicked");
//! println!("Camera at {:?}", navigator.camera());
//! # Ok(())
//! # }
//! ```
//!
//! # Components
//!
//! - **Geocoding** ([`wayfinder_providers`]): HTTP clients for Nominatim and
//!   Mapbox, normalized into [`CandidateLocation`].
//! - **Debounce** ([`Debouncer`]): one cancellable delayed task at a time.
//! - **Search state** ([`SearchMachine`]): query, candidates, panel visibility
//!   and loading flag, guarded against stale responses.
//! - **Navigation** ([`MapNavigator`]): camera animation and the single
//!   selection marker on a pluggable [`MapSurface`].
//! - **Session** ([`SearchSession`]): the event loop tying them together.
use once_cell::sync::OnceCell;
use tracing::level_filters::LevelFilter;
use tracing_subscriber::{EnvFilter, fmt::format::FmtSpan};

mod config;
pub mod error;
mod map;
mod search;
mod session;

pub use config::{MAX_ZOOM, SessionConfig, SessionConfigBuilder};
pub use map::{
    CameraMove, CameraTarget, DEFAULT_CAMERA, DEFAULT_FLY_DURATION, DEFAULT_TARGET_ZOOM,
    MapNavigator, MapSurface, MarkerId, MemoryMarker, MemorySurface, SelectedLocation,
};
pub use search::{
    DEFAULT_DEBOUNCE, Debouncer, InputEffect, RequestSeq, Resolution, SearchMachine, SearchPhase,
    SearchSnapshot,
};
pub use session::{SearchHandle, SearchSession, SessionCommand, SessionSnapshot};
pub use wayfinder_providers as providers;
pub use wayfinder_providers::{
    CandidateId, CandidateLocation, Coordinates, GeocodeConfig, GeocodeError, Geocoder,
    ProviderKind,
};
#[cfg(feature = "http")]
pub use wayfinder_providers::{GeocodeClient, chat::ChatProxy};

static LOGGER_INIT: OnceCell<()> = OnceCell::new();

/// Initialize logging for Wayfinder.
///
/// Sets up structured logging honouring `RUST_LOG`, falling back to `level`.
/// Safe to call more than once; only the first call installs the subscriber.
///
/// # Examples
///
/// ```rust
/// use tracing::Level;
/// use wayfinder::init_logging;
///
/// init_logging(Level::INFO)?;
/// # Ok::<(), wayfinder::error::WayfinderError>(())
/// ```
pub fn init_logging(level: impl Into<LevelFilter>) -> Result<&'static (), error::WayfinderError> {
    let level: LevelFilter = level.into();
    LOGGER_INIT.get_or_try_init(|| {
        let filter = EnvFilter::try_from_default_env()
            .or_else(|_| EnvFilter::try_new(level.to_string()))?
            .add_directive("hyper_util=warn".parse()?)
            .add_directive("reqwest=warn".parse()?);

        tracing_subscriber::fmt::fmt()
            .with_env_filter(filter)
            .with_span_events(FmtSpan::CLOSE)
            .init();
        Ok(())
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_init_logging_is_idempotent() {
        assert!(init_logging(tracing::Level::WARN).is_ok());
        assert!(init_logging(tracing::Level::DEBUG).is_ok());
    }

    // Only built by `cargo test -p wayfinder --no-default-features`.
    #[cfg(not(feature = "http"))]
    mod without_http {
        use super::*;

        struct NoMatches;

        impl Geocoder for NoMatches {
            async fn search(&self, _query: &str) -> providers::Result<Vec<CandidateLocation>> {
                Ok(Vec::new())
            }
        }

        #[tokio::test(start_paused = true)]
        async fn test_session_runs_without_http_clients() {
            let (session, handle) =
                SearchSession::new(NoMatches, MemorySurface::new(), &SessionConfig::default());
            let running = tokio::spawn(session.run());

            handle.input("Golden Gate").unwrap();
            let settled = handle
                .wait_for(|s| s.search.phase == SearchPhase::Idle && !s.search.query.is_empty())
                .await
                .unwrap();
            assert!(settled.search.candidates.is_empty());

            handle.shutdown().unwrap();
            let navigator = running.await.unwrap();
            assert!(navigator.selected().is_none());
        }
    }
}
