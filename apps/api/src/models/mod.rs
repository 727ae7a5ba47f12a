pub mod body;
pub mod nutrition;
pub mod recovery;
pub mod workout;
