// Module declarations
pub(crate) mod transfers_model;
pub(crate) mod transfers_repository;
pub(crate) mod transfers_service;

// Re-export the public interface
pub use transfers_model::{NewTransfer, Transfer, TransferDB};
pub use transfers_repository::TransferRepository;
pub use transfers_service::TransferService;
