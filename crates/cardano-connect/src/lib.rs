pub use crate::{cardano_connect::CardanoConnect, network::Network};

#[cfg(any(test, feature = "mock"))]
pub use crate::mock::MockConnect;

mod cardano_connect;
#[cfg(any(test, feature = "mock"))]
mod mock;
mod network;
