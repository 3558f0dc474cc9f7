mod peer;
pub use peer::{Peer, PeerKey, PeerKeyError, PEER_KEY_LEN};

mod state;
pub use state::PeerState;

mod display;
pub use display::DisplayName;

mod registry;
pub use registry::{join_keys, HandshakeRow, HandshakeStamp, PeerRegistry, SortedBuckets};
