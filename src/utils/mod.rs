pub mod card;
pub mod jwt;
