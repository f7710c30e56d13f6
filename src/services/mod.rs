pub mod archiver_client;
pub mod flatten;
pub mod gateway_service;
