pub mod admins;
pub mod catalog;
pub mod submissions;
