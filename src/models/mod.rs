pub mod agent;
pub mod error;
pub mod mint;
pub mod nft;
pub mod upload;
