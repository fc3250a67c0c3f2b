pub mod auth_form;
pub mod create_page;
pub mod dashboard;
pub mod home;
pub mod input_panel;
pub mod navbar;
pub mod output_panel;
pub mod resume_card;
pub mod resume_form;
pub mod toaster;
