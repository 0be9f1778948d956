pub mod reward_mapper;

pub use reward_mapper::RewardMapper;
