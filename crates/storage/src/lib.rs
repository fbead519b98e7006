#![forbid(unsafe_code)]

pub mod repository;
pub mod sqlite;

pub use repository::{
    InMemoryRepository, QuizResultId, QuizResultRepository, QuizResultRow, Storage, StorageError,
};
