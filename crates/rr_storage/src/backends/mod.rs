pub mod memory;
pub mod milvus;
