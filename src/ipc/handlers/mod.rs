pub mod classes;
pub mod core;
pub mod enrollments;
pub mod grades;
pub mod reports;
pub mod students;
pub mod subjects;
pub mod teachers;
