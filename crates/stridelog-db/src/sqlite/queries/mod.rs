pub mod focus;
pub mod habits;
pub mod tasks;
pub mod users;
