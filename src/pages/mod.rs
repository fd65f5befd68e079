pub mod dashboard;
pub mod entity_list;
pub mod help;
pub mod login;
pub mod main_menu;
