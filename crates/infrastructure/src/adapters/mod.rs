//! Adapters implementing the application ports.

mod reqwest_session;

pub use reqwest_session::ReqwestSession;
