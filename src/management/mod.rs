mod session;
mod state;
mod store;

pub use session::Session;
pub use state::PendingAuthState;
pub use state::StateRegistry;
pub use store::FileTokenStore;
pub use store::MemoryTokenStore;
pub use store::TokenStore;
