pub mod error;
pub mod flyovers;
pub mod location;
pub mod satellites;
pub mod tracker;
