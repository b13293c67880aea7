pub mod document;
pub mod embedded;
pub mod factory;
pub mod in_memory;
pub mod mongo;

pub use embedded::SledDocumentStore;
pub use factory::DocumentStoreFactory;
pub use in_memory::InMemoryDocumentStore;
pub use mongo::MongoDocumentStore;
