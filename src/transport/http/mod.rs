pub mod router;
pub mod types;
pub mod handlers {
    pub mod common;
    pub mod health;
    pub mod orders;
    pub mod products;
}

pub use router::{create_router, with_middleware, ApiDoc};
pub use types::AppState;
