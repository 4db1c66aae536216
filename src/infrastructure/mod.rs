pub mod http;
pub mod mock;

pub use http::ReqwestTransport;
pub use mock::MockTransport;
