pub mod constants;
pub mod contact;
pub mod credentials;
pub mod settings;
