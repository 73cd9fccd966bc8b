pub mod libsql;
pub mod mongo;
