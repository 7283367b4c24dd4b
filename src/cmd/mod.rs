pub mod resolve;
pub mod serve;
