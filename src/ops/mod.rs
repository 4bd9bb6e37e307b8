pub mod hide_ops;
pub mod navigate;
pub mod scan;
pub mod session;
pub mod toggle;
pub mod views;
pub mod visibility;
