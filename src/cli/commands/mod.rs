pub mod estimate;
pub mod export;
pub mod inspect;
