pub mod activity;
pub mod email_security;
pub mod license;
pub mod photo;
pub mod public_file;
pub mod workflow;
