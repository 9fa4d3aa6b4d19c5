pub mod confirm;
pub mod form;
pub mod import;
pub mod list;
pub mod menu;
pub mod quiz;

pub use confirm::draw_confirm;
pub use form::{EntryForm, FormOutcome, draw_form, handle_form_input};
pub use import::draw_import;
pub use list::draw_list;
pub use menu::{MENU_ITEMS, MenuItem, draw_menu};
pub use quiz::draw_quiz;
