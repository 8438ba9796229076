pub mod migrate;
pub mod session;
pub mod tenant;
