pub mod health;
pub mod layout;
pub mod navigation;
pub mod permissions;
pub mod session;
