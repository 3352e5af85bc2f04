pub mod request_book;
pub mod request_repository;

pub use request_book::RequestBook;
pub use request_repository::RequestRepository;
