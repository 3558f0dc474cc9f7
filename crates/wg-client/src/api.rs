use async_trait::async_trait;
use wgmon_types::{HandshakeRow, PeerKey};

use crate::Result;

/// Probe surface of the WireGuard control tool.
///
/// The orchestrator is generic over this trait so tests can script probe
/// output and failures without a live interface.
#[async_trait]
pub trait WgApi: Send + Sync {
    /// `wg show <iface> latest-handshakes`, parsed into rows.
    async fn latest_handshakes(&self, iface: &str) -> Result<Vec<HandshakeRow>>;

    /// `wg show <iface> public-key`: this node's own key.
    async fn public_key(&self, iface: &str) -> Result<PeerKey>;
}

#[cfg(any(test, feature = "mocks"))]
mockall::mock! {
    pub WgApi { }

    #[async_trait]
    impl WgApi for WgApi {
        async fn latest_handshakes(&self, iface: &str) -> Result<Vec<HandshakeRow>>;

        async fn public_key(&self, iface: &str) -> Result<PeerKey>;
    }
}
