mod memory;
mod postgres;

pub use memory::MemoryWorkflowStore;
pub use postgres::PgWorkflowStore;
