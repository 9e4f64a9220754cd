pub mod desktop;
pub mod email;
