mod archive_repo;
mod database;


pub use archive_repo::ArchiveRepo;
pub use database::Database;
