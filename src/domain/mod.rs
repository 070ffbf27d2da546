// Domain layer - Plain data shared by every other layer
pub mod command;
pub mod device;
pub mod readings;
