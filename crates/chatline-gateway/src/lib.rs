pub mod connection;
pub mod dispatcher;
pub mod error;
pub mod fanout;
pub mod registry;
pub mod store;

pub use dispatcher::Dispatcher;
pub use error::GatewayError;
