//! Curator engine: HTTP gateway and the async session that executes core
//! effects.
mod error;
mod gateway;
mod session;
mod settings;
mod wire;

pub use error::{GatewayError, SessionError};
pub use gateway::{CollectionChange, FavoriteState, Gateway, HttpGateway, RemovedCompanies};
pub use session::{RefreshCallback, Session};
pub use settings::{GatewaySettings, SessionSettings, DEFAULT_BASE_URL};
