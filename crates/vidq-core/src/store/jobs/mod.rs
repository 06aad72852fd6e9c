//! Job CRUD on the `jobs` table.

mod read;
mod write;
