pub mod auth_service;
pub mod gateway;
pub mod insights_service;
pub mod pipeline_service;
pub mod trend_service;
pub mod user_service;

pub use gateway::{BytezGateway, GatewayError, ModelGateway, ModelKind};
