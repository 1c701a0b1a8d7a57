pub mod files;
pub mod inventory;
pub mod runs;
