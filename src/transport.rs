pub use inboxcore::net::{Transport, TransportEvent, TransportFactory};
pub use sakura_inbox_tokio_transport::TokioWebSocketTransportFactory;
