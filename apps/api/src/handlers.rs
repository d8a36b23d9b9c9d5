pub mod health;
pub mod permissions;
pub mod security;
