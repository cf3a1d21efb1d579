pub mod throttle;
pub mod wxpusher;
