pub mod account;
pub mod block;
pub mod call;
pub mod filter;
pub mod logs;
pub mod transaction;
pub mod types;
