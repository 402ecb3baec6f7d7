pub mod rabcdasm;

pub use rabcdasm::RabcdasmBackend;
