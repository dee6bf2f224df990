//! Location search: the state machine and the debounce controller that feeds it.

mod debounce;
mod state;

pub use debounce::{DEFAULT_DEBOUNCE, Debouncer};
pub use state::{
    InputEffect, RequestSeq, Resolution, SearchMachine, SearchPhase, SearchSnapshot,
};
