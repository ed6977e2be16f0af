//! Request and response bodies

pub mod contract;
pub mod property;
pub mod rent;
pub mod tenant;
pub mod utility;
