use crate::state::AppState;
use std::future::Future;
use std::time::Duration;
use tokio::task::JoinHandle;

pub const DEFAULT_ADDRESS: &str = "123 Main Street, New York, NY 10001";

/// Source of the device location shown on the home screen.
///
/// Each call resolves exactly once to a display string; there is no
/// cancellation.
pub trait LocationProvider: Send + Sync + 'static {
    fn current_location(&self) -> impl Future<Output = String> + Send;
}

/// Fixed address returned after a delay.
#[derive(Debug, Clone)]
pub struct SimulatedLocation {
    delay: Duration,
    address: String,
}

impl SimulatedLocation {
    pub fn new(delay: Duration, address: impl Into<String>) -> Self {
        Self {
            delay,
            address: address.into(),
        }
    }
}

impl Default for SimulatedLocation {
    fn default() -> Self {
        Self::new(Duration::from_secs(2), DEFAULT_ADDRESS)
    }
}

impl LocationProvider for SimulatedLocation {
    fn current_location(&self) -> impl Future<Output = String> + Send {
        let delay = self.delay;
        let address = self.address.clone();
        async move {
            tokio::time::sleep(delay).await;
            address
        }
    }
}

/// Resolves the location once in the background and stores it in `state`.
pub fn spawn_location_lookup<P: LocationProvider>(state: AppState, provider: P) -> JoinHandle<()> {
    tokio::spawn(async move {
        let address = provider.current_location().await;
        tracing::info!("Location resolved: {}", address);
        state.set_location(address).await;
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::{LocationState, SeedData};

    #[tokio::test]
    async fn test_lookup_updates_state() {
        let state = AppState::new(SeedData::empty(), DEFAULT_ADDRESS.to_string());
        assert_eq!(*state.location.read().await, LocationState::Determining);

        let provider = SimulatedLocation::new(Duration::from_millis(10), "7 Harbor Rd");
        spawn_location_lookup(state.clone(), provider).await.unwrap();

        assert_eq!(
            *state.location.read().await,
            LocationState::Resolved("7 Harbor Rd".to_string())
        );
        assert_eq!(state.trigger_location().await, "7 Harbor Rd");
    }

    #[tokio::test]
    async fn test_each_call_resolves() {
        let provider = SimulatedLocation::new(Duration::from_millis(1), "A");
        assert_eq!(provider.current_location().await, "A");
        assert_eq!(provider.current_location().await, "A");
    }
}
