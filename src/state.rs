use crate::database::Store;

/// Process-lifetime dependencies, constructed once at startup and passed
/// explicitly to every handler through axum state.
#[derive(Clone)]
pub struct AppState {
    pub store: Store,
}
