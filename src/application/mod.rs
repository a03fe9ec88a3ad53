pub mod application_models;
pub mod application_dto;
pub mod application_repository;
pub mod application_handlers;

pub use application_models::{Application, ApplicationStatus};
pub use application_repository::ApplicationRepository;
pub use application_handlers::{
    create_application, delete_application, get_application, get_applications,
    pin_application, update_application, update_application_status,
};
