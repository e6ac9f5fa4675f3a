pub mod dates;
pub mod handlers;
pub mod interviews;
pub mod kanban;
pub mod models;
pub mod repo;
pub mod sorting;
