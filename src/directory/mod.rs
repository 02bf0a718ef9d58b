pub mod models;
pub mod repository;

pub use models::{AssociationRole, MatchRecord, PlayerCategory, PlayerRecord, TeamAssociation, TeamRecord};
pub use repository::{DirectoryRepository, InMemoryDirectoryRepository, PostgresDirectoryRepository};
