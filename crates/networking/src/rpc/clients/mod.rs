pub mod qtum;
