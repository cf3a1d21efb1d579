pub mod config;

pub mod notify {
    pub mod entity;
    pub mod error;
    pub mod port;
}
