//! Navigation between the assessment and the dialogue.

use std::sync::Mutex;

/// Entry points the installer can send the user to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Assessment,
    Dialogue,
}

impl Route {
    pub fn path(&self) -> &'static str {
        match self {
            Self::Assessment => "/assessment",
            Self::Dialogue => "/chat",
        }
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.path())
    }
}

/// Performs a full redirect to a route. Implemented by the presentation layer.
pub trait Navigator: Send + Sync {
    fn navigate(&self, route: Route);
}

/// Navigator that only records requested routes.
#[derive(Debug, Default)]
pub struct RecordingNavigator {
    routes: Mutex<Vec<Route>>,
}

impl RecordingNavigator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Every route requested so far, oldest first.
    pub fn routes(&self) -> Vec<Route> {
        self.routes
            .lock()
            .map(|routes| routes.clone())
            .unwrap_or_default()
    }
}

impl Navigator for RecordingNavigator {
    fn navigate(&self, route: Route) {
        tracing::info!(route = %route, "Navigating");
        if let Ok(mut routes) = self.routes.lock() {
            routes.push(route);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn records_in_order() {
        let nav = RecordingNavigator::new();
        nav.navigate(Route::Dialogue);
        nav.navigate(Route::Assessment);
        assert_eq!(nav.routes(), vec![Route::Dialogue, Route::Assessment]);
        assert_eq!(Route::Dialogue.to_string(), "/chat");
    }
}
