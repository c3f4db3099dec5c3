use std::sync::Arc;
use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::debug;

use super::DirectoryBackend;

/// Apply every non-empty value published on `route` as the selected country code.
///
/// Runs until the route sender is dropped. Values published faster than the
/// task runs are coalesced; only the latest one is applied.
pub fn follow_route(
    backend: Arc<dyn DirectoryBackend>,
    mut route: watch::Receiver<String>,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            let code = route.borrow_and_update().clone();
            if !code.is_empty() {
                debug!(code = %code, "route changed");
                drop(backend.set_country_code(&code));
            }
            if route.changed().await.is_err() {
                debug!("route closed");
                break;
            }
        }
    })
}
