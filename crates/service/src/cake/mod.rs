//! Cake module: three-layer architecture (domain, repository, service).
//!
//! The mapper converts between repository entities and the DTOs handed to
//! callers; `repo` holds the SeaORM implementation of the repository.

pub mod domain;
pub mod mapper;
pub mod repository;
pub mod repo;
pub mod service;

pub use domain::{CakeDto, CakeEntity, CakeRequest};
pub use service::CakeService;
