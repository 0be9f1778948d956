pub mod config_repository;
pub mod connection;
pub mod reward_repository;

#[cfg(test)]
pub mod test_utils;

pub use config_repository::ConfigRepository;
pub use connection::YamlConnection;
pub use reward_repository::YamlRewardRepository;
