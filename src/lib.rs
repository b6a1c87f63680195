pub mod bootstrap;
pub mod config;
pub mod db;
pub mod engine;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod router;

pub use error::FlowError;
pub use router::{FlowState, flow_router};
